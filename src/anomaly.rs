//! Differences against the historical baseline

use crate::aggregation::{AnnualSeries, MonthlyClimatology};

/// Scenario climatology minus historical climatology, per calendar month
pub fn monthly_anomaly(
    scenario: &MonthlyClimatology,
    historical: &MonthlyClimatology,
) -> MonthlyClimatology {
    let mut values = *scenario.values();
    for (v, h) in values.iter_mut().zip(historical.values()) {
        *v -= h;
    }
    MonthlyClimatology::from_values(values)
}

/// Scenario annual series minus the scalar historical annual mean.
///
/// The baseline is the mean of the historical annual aggregates, not a
/// year-by-year pairing, so scenario and historical periods may differ.
pub fn annual_anomaly(scenario: &AnnualSeries, historical_mean: f64) -> AnnualSeries {
    AnnualSeries {
        years: scenario.years.clone(),
        values: scenario.values.iter().map(|v| v - historical_mean).collect(),
    }
}

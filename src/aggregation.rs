//! Monthly and annual resampling of time series
//!
//! Bins are calendar months and calendar years of the series' own calendar.
//! Only bins holding at least one sample are produced. NaN samples are
//! skipped: an all-NaN bin is NaN for mean and max, 0 for sum.

use crate::constants::SUM_VARIABLES;
use crate::series::{nan_mean, TimeSeries};
use std::collections::BTreeMap;

/// How samples inside a bin are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggMethod {
    Mean,
    Sum,
}

impl AggMethod {
    /// Accumulative quantities (precipitation) are summed, everything else averaged.
    pub fn for_variable(variable: &str) -> Self {
        if SUM_VARIABLES.contains(&variable) {
            Self::Sum
        } else {
            Self::Mean
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
        }
    }

    fn combine(self, values: &[f64]) -> f64 {
        match self {
            Self::Mean => nan_mean(values.iter().copied()),
            Self::Sum => values.iter().filter(|v| v.is_finite()).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyValue {
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

/// One value per (year, month) bin, in chronological order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlySeries {
    pub points: Vec<MonthlyValue>,
}

/// Per-calendar-month values; slot `i` holds month `i + 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyClimatology {
    values: [f64; 12],
}

impl MonthlyClimatology {
    pub const fn from_values(values: [f64; 12]) -> Self {
        Self { values }
    }

    /// Value for calendar month `month` (1..=12)
    pub fn get(&self, month: u32) -> Option<f64> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[f64; 12] {
        &self.values
    }

    /// `(month, value)` pairs for months 1 through 12
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        (1u32..).zip(self.values.iter().copied())
    }
}

/// One value per calendar year, in chronological order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnualSeries {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl AnnualSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the finite annual values
    pub fn mean(&self) -> f64 {
        nan_mean(self.values.iter().copied())
    }

    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.years.iter().copied().zip(self.values.iter().copied())
    }

    fn from_bins(bins: BTreeMap<i32, Vec<f64>>, reduce: impl Fn(&[f64]) -> f64) -> Self {
        let (years, values) = bins
            .into_iter()
            .map(|(year, samples)| (year, reduce(&samples)))
            .unzip();
        Self { years, values }
    }
}

fn annual_bins(series: &TimeSeries) -> BTreeMap<i32, Vec<f64>> {
    let mut bins: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (date, value) in series.points() {
        bins.entry(date.year).or_default().push(value);
    }
    bins
}

pub fn monthly_aggregate(series: &TimeSeries, method: AggMethod) -> MonthlySeries {
    let mut bins: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for (date, value) in series.points() {
        bins.entry((date.year, date.month)).or_default().push(value);
    }

    let points = bins
        .into_iter()
        .map(|((year, month), samples)| MonthlyValue {
            year,
            month,
            value: method.combine(&samples),
        })
        .collect();
    MonthlySeries { points }
}

/// Monthly aggregate averaged across years, grouped by calendar month
pub fn monthly_climatology(series: &TimeSeries, method: AggMethod) -> MonthlyClimatology {
    let monthly = monthly_aggregate(series, method);
    let mut by_month: [Vec<f64>; 12] = Default::default();
    for point in &monthly.points {
        by_month[point.month as usize - 1].push(point.value);
    }

    let mut values = [f64::NAN; 12];
    for (slot, samples) in values.iter_mut().zip(by_month.iter()) {
        *slot = nan_mean(samples.iter().copied());
    }
    MonthlyClimatology { values }
}

/// Annual mean or annual sum depending on `method`
pub fn annual_aggregate(series: &TimeSeries, method: AggMethod) -> AnnualSeries {
    AnnualSeries::from_bins(annual_bins(series), |samples| method.combine(samples))
}

/// Largest finite value of each year
pub fn annual_max(series: &TimeSeries) -> AnnualSeries {
    AnnualSeries::from_bins(annual_bins(series), |samples| {
        samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::NAN, f64::max)
    })
}

//! The six chart kinds produced by the analysis tool
//!
//! Every function writes `<variable>_<kind>.png` into the context's output
//! directory and returns the path. The wind rose and the return-level chart
//! return `None` when there is nothing to draw.

use super::svg::{rose_svg, LineChart, RosePanel};
use super::{color_for, write_png};
use crate::aggregation::{AnnualSeries, MonthlyClimatology};
use crate::constants::{
    PLOT_ANNUAL_ANOMALIES, PLOT_ANNUAL_SERIES, PLOT_MONTHLY_ANOMALIES, PLOT_MONTHLY_CLIMATOLOGY,
    PLOT_RETURN_LEVELS, PLOT_WIND_ROSE,
};
use crate::errors::Result;
use crate::extremes::ReturnLevels;
use crate::series::TimeSeries;
use crate::wind::rose_histogram;
use std::path::{Path, PathBuf};
use tracing::warn;

const ROSE_SECTORS: usize = 16;

/// Labels and destination shared by all charts of one run
#[derive(Debug, Clone)]
pub struct ChartContext {
    pub variable: String,
    pub y_label: String,
    pub output_dir: PathBuf,
}

impl ChartContext {
    pub fn new(variable: impl Into<String>, y_label: impl Into<String>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            variable: variable.into(),
            y_label: y_label.into(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// `<output_dir>/<variable>_<kind>.png`
    pub fn path_for(&self, kind: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{kind}.png", self.variable))
    }

    fn save(&self, svg: &str, kind: &str) -> Result<PathBuf> {
        let path = self.path_for(kind);
        write_png(svg, &path)?;
        Ok(path)
    }
}

fn month_points(climatology: &MonthlyClimatology) -> Vec<(f64, f64)> {
    climatology.iter().map(|(m, v)| (f64::from(m), v)).collect()
}

fn year_points(series: &AnnualSeries) -> Vec<(f64, f64)> {
    series.points().map(|(y, v)| (f64::from(y), v)).collect()
}

fn month_ticks() -> Vec<f64> {
    (1..=12).map(f64::from).collect()
}

pub fn plot_monthly_climatology(ctx: &ChartContext, climatologies: &[(String, MonthlyClimatology)]) -> Result<PathBuf> {
    let chart = climatologies.iter().enumerate().fold(
        LineChart::new(
            format!("Monthly climatology - {}", ctx.variable),
            "Month",
            ctx.y_label.as_str(),
        )
        .x_ticks(month_ticks()),
        |chart, (i, (experiment, clim))| chart.line(experiment.as_str(), color_for(experiment, i), month_points(clim)),
    );
    ctx.save(&chart.to_svg(), PLOT_MONTHLY_CLIMATOLOGY)
}

/// Annual series with a dashed line at each experiment's mean
pub fn plot_annual_series(ctx: &ChartContext, annual: &[(String, AnnualSeries)], means: &[(String, f64)]) -> Result<PathBuf> {
    let mut chart = LineChart::new(
        format!("Annual series - {}", ctx.variable),
        "Year",
        ctx.y_label.as_str(),
    );
    for (i, (experiment, series)) in annual.iter().enumerate() {
        chart = chart.line(experiment.as_str(), color_for(experiment, i), year_points(series));
    }
    for (i, (experiment, mean)) in means.iter().enumerate() {
        chart = chart.reference(
            *mean,
            color_for(experiment, i),
            true,
            Some(format!("{experiment} mean")),
        );
    }
    ctx.save(&chart.to_svg(), PLOT_ANNUAL_SERIES)
}

pub fn plot_monthly_anomalies(ctx: &ChartContext, anomalies: &[(String, MonthlyClimatology)]) -> Result<PathBuf> {
    let mut chart = LineChart::new(
        format!("Monthly anomalies vs historical - {}", ctx.variable),
        "Month",
        format!("Anomaly of {}", ctx.y_label),
    )
    .x_ticks(month_ticks())
    .reference(0.0, "black", false, None);
    // Scenario colors are offset by one: slot 0 belongs to the historical run
    for (i, (experiment, anomaly)) in anomalies.iter().enumerate() {
        chart = chart.line(experiment.as_str(), color_for(experiment, i + 1), month_points(anomaly));
    }
    ctx.save(&chart.to_svg(), PLOT_MONTHLY_ANOMALIES)
}

pub fn plot_annual_anomalies(ctx: &ChartContext, anomalies: &[(String, AnnualSeries)]) -> Result<PathBuf> {
    let mut chart = LineChart::new(
        format!("Annual anomalies vs historical mean - {}", ctx.variable),
        "Year",
        format!("Anomaly of {}", ctx.y_label),
    )
    .reference(0.0, "black", true, None);
    for (i, (experiment, anomaly)) in anomalies.iter().enumerate() {
        chart = chart.line(experiment.as_str(), color_for(experiment, i + 1), year_points(anomaly));
    }
    ctx.save(&chart.to_svg(), PLOT_ANNUAL_ANOMALIES)
}

/// One polar histogram per experiment that has direction data
pub fn plot_wind_rose(ctx: &ChartContext, directions: &[(String, Option<TimeSeries>)]) -> Result<Option<PathBuf>> {
    let panels: Vec<RosePanel> = directions
        .iter()
        .enumerate()
        .filter_map(|(i, (experiment, series))| {
            let series = series.as_ref()?;
            let frequencies = rose_histogram(&series.values, ROSE_SECTORS);
            (!frequencies.is_empty()).then(|| RosePanel {
                title: experiment.clone(),
                color: color_for(experiment, i).to_string(),
                frequencies,
            })
        })
        .collect();

    if panels.is_empty() {
        warn!(variable = %ctx.variable, "No wind direction data, skipping wind rose");
        return Ok(None);
    }
    ctx.save(&rose_svg(&panels, 800), PLOT_WIND_ROSE).map(Some)
}

/// Return level against return period, one line per experiment that has levels.
/// Colors follow the position in `levels`, so pass every experiment of the run.
pub fn plot_return_levels(ctx: &ChartContext, levels: &[(String, Option<ReturnLevels>)]) -> Result<Option<PathBuf>> {
    let Some(chart) = return_level_chart(ctx, levels) else {
        warn!(variable = %ctx.variable, "No return levels, skipping return level chart");
        return Ok(None);
    };
    ctx.save(&chart.to_svg(), PLOT_RETURN_LEVELS).map(Some)
}

fn return_level_chart(ctx: &ChartContext, levels: &[(String, Option<ReturnLevels>)]) -> Option<LineChart> {
    let mut chart = LineChart::new(
        format!("Return levels (GEV) - {}", ctx.variable),
        "Return period (years)",
        ctx.y_label.as_str(),
    );
    let mut periods: Vec<f64> = Vec::new();
    for (i, (experiment, by_period)) in levels.iter().enumerate() {
        let Some(by_period) = by_period.as_ref().filter(|l| !l.is_empty()) else {
            continue;
        };
        let points: Vec<(f64, f64)> = by_period.iter().map(|(p, l)| (f64::from(*p), *l)).collect();
        periods.extend(points.iter().map(|p| p.0));
        chart = chart.line(experiment.as_str(), color_for(experiment, i), points);
    }

    if chart.series.is_empty() {
        return None;
    }
    periods.sort_by(f64::total_cmp);
    periods.dedup();
    Some(chart.x_ticks(periods))
}

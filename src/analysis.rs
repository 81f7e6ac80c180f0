//! End-to-end analysis of one variable across experiments
//!
//! The historical run is the baseline: it must be present. Scenario runs that
//! cannot be located are skipped with a warning, as long as at least one remains.

use crate::aggregation::{
    annual_aggregate, annual_max, monthly_climatology, AggMethod, AnnualSeries, MonthlyClimatology,
};
use crate::anomaly::{annual_anomaly, monthly_anomaly};
use crate::constants::{
    experiment_subdir, is_wind_speed, DEFAULT_BASE_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_RETURN_PERIODS,
    DEFAULT_SCENARIOS, DEFAULT_VARIABLE, HISTORICAL,
};
use crate::dataset::with_dataset;
use crate::errors::{CmipVisError, Result};
use crate::extremes::{compute_return_levels, ReturnLevels};
use crate::locate::find_file;
use crate::render::{
    plot_annual_anomalies, plot_annual_series, plot_monthly_anomalies, plot_monthly_climatology,
    plot_return_levels, plot_wind_rose, ChartContext,
};
use crate::series::{load_series_from, TimeSeries};
use crate::wind::wind_direction_from;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Inputs of one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub variable: String,
    /// Scenario experiments to compare against the historical run
    pub experiments: Vec<String>,
    pub historical_file: Option<PathBuf>,
    /// Explicit `experiment -> file` overrides
    pub scenario_files: Vec<(String, PathBuf)>,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub return_periods: Vec<u32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            variable: DEFAULT_VARIABLE.to_string(),
            experiments: DEFAULT_SCENARIOS.iter().map(|s| s.to_string()).collect(),
            historical_file: None,
            scenario_files: Vec::new(),
            data_dir: PathBuf::from(DEFAULT_BASE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            return_periods: DEFAULT_RETURN_PERIODS.to_vec(),
        }
    }
}

impl AnalysisConfig {
    fn scenario_override(&self, experiment: &str) -> Option<&Path> {
        self.scenario_files
            .iter()
            .rev()
            .find(|(name, _)| name == experiment)
            .map(|(_, path)| path.as_path())
    }

    /// Historical input: the explicit file, else the newest match under `data_dir`.
    pub fn historical_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.historical_file {
            return Ok(path.clone());
        }
        find_file(&self.data_dir, HISTORICAL, &self.variable)?.ok_or_else(|| {
            CmipVisError::HistoricalFileNotFound {
                dir: self.data_dir.join(experiment_subdir(HISTORICAL)),
            }
        })
    }

    fn scenario_path(&self, experiment: &str) -> Result<Option<PathBuf>> {
        match self.scenario_override(experiment) {
            Some(path) => Ok(Some(path.to_path_buf())),
            None => find_file(&self.data_dir, experiment, &self.variable),
        }
    }
}

/// Series and aggregates of one experiment
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    pub name: String,
    pub source: PathBuf,
    pub series: TimeSeries,
    pub climatology: MonthlyClimatology,
    pub annual: AnnualSeries,
    pub annual_mean: f64,
    /// Only loaded for wind speed variables
    pub wind_direction: Option<TimeSeries>,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub variable: String,
    pub units: Option<String>,
    pub y_label: String,
    pub historical: ExperimentResult,
    pub scenarios: Vec<ExperimentResult>,
    pub monthly_anomalies: Vec<(String, MonthlyClimatology)>,
    pub annual_anomalies: Vec<(String, AnnualSeries)>,
    pub return_levels: Vec<(String, ReturnLevels)>,
    pub plots: Vec<PathBuf>,
}

impl AnalysisReport {
    /// Historical first, then scenarios in request order
    pub fn experiments(&self) -> impl Iterator<Item = &ExperimentResult> {
        std::iter::once(&self.historical).chain(self.scenarios.iter())
    }
}

/// `"<variable> (<units>)"`, or just the variable without units
pub fn axis_label(variable: &str, units: Option<&str>) -> String {
    match units.map(str::trim).filter(|u| !u.is_empty()) {
        Some(units) => format!("{variable} ({units})"),
        None => variable.to_string(),
    }
}

fn load_experiment(name: &str, path: &Path, variable: &str, method: AggMethod) -> Result<ExperimentResult> {
    let wind = is_wind_speed(variable);
    let (series, wind_direction) = with_dataset(path, |dataset| {
        let series = load_series_from(dataset, variable)?;
        let direction = if wind {
            match wind_direction_from(dataset.file()) {
                Ok(direction) => direction,
                Err(e) => {
                    warn!(experiment = name, error = %e, "Cannot derive wind direction");
                    None
                }
            }
        } else {
            None
        };
        Ok((series, direction))
    })?;

    let climatology = monthly_climatology(&series, method);
    let annual = annual_aggregate(&series, method);
    let annual_mean = annual.mean();
    debug!(
        experiment = name,
        years = annual.len(),
        method = method.as_str(),
        "Aggregated series"
    );

    Ok(ExperimentResult {
        name: name.to_string(),
        source: path.to_path_buf(),
        series,
        climatology,
        annual,
        annual_mean,
        wind_direction,
    })
}

fn return_levels_for(experiment: &ExperimentResult, periods: &[u32]) -> Option<ReturnLevels> {
    let maxima = annual_max(&experiment.series);
    match compute_return_levels(&maxima.values, periods) {
        Ok(levels) => Some(levels),
        Err(e) => {
            warn!(experiment = %experiment.name, error = %e, "Cannot compute return levels");
            None
        }
    }
}

/// Runs the full analysis and writes every chart into `config.output_dir`.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let method = AggMethod::for_variable(&config.variable);

    let historical_path = config.historical_path()?;
    info!(path = %historical_path.display(), "Historical input");
    let historical = load_experiment(HISTORICAL, &historical_path, &config.variable, method)?;
    let units = historical.series.units.clone();
    let y_label = axis_label(&config.variable, units.as_deref());

    let mut scenarios = Vec::new();
    for experiment in &config.experiments {
        if experiment == HISTORICAL {
            debug!("Historical run listed as a scenario, ignoring");
            continue;
        }
        let Some(path) = config.scenario_path(experiment)? else {
            warn!(experiment = %experiment, "No file found, skipping");
            continue;
        };
        info!(experiment = %experiment, path = %path.display(), "Scenario input");
        scenarios.push(load_experiment(experiment, &path, &config.variable, method)?);
    }
    if scenarios.is_empty() {
        return Err(CmipVisError::NoScenarioFiles);
    }

    let monthly_anomalies = scenarios
        .iter()
        .map(|s| (s.name.clone(), monthly_anomaly(&s.climatology, &historical.climatology)))
        .collect();
    let annual_anomalies = scenarios
        .iter()
        .map(|s| (s.name.clone(), annual_anomaly(&s.annual, historical.annual_mean)))
        .collect();

    let wind = is_wind_speed(&config.variable);
    let return_levels = if wind {
        std::iter::once(&historical)
            .chain(scenarios.iter())
            .filter_map(|e| return_levels_for(e, &config.return_periods).map(|l| (e.name.clone(), l)))
            .collect()
    } else {
        Vec::new()
    };

    let mut report = AnalysisReport {
        variable: config.variable.clone(),
        units,
        y_label,
        historical,
        scenarios,
        monthly_anomalies,
        annual_anomalies,
        return_levels,
        plots: Vec::new(),
    };
    report.plots = render_report(&report, &config.output_dir, wind)?;
    println!("[ok] charts saved in {}", config.output_dir.display());
    Ok(report)
}

/// Writes the charts of `report`; the wind charts only for wind speed variables.
pub fn render_report(report: &AnalysisReport, output_dir: &Path, wind: bool) -> Result<Vec<PathBuf>> {
    let ctx = ChartContext::new(report.variable.as_str(), report.y_label.as_str(), output_dir);

    let climatologies: Vec<(String, MonthlyClimatology)> = report
        .experiments()
        .map(|e| (e.name.clone(), e.climatology))
        .collect();
    let annual: Vec<(String, AnnualSeries)> = report
        .experiments()
        .map(|e| (e.name.clone(), e.annual.clone()))
        .collect();
    let means: Vec<(String, f64)> = report
        .experiments()
        .map(|e| (e.name.clone(), e.annual_mean))
        .collect();

    let mut plots = vec![
        plot_monthly_climatology(&ctx, &climatologies)?,
        plot_annual_series(&ctx, &annual, &means)?,
        plot_monthly_anomalies(&ctx, &report.monthly_anomalies)?,
        plot_annual_anomalies(&ctx, &report.annual_anomalies)?,
    ];

    if wind {
        let directions: Vec<(String, Option<TimeSeries>)> = report
            .experiments()
            .map(|e| (e.name.clone(), e.wind_direction.clone()))
            .collect();
        plots.extend(plot_wind_rose(&ctx, &directions)?);
        let levels: Vec<(String, Option<ReturnLevels>)> = report
            .experiments()
            .map(|e| {
                let levels = report
                    .return_levels
                    .iter()
                    .find(|(name, _)| name == &e.name)
                    .map(|(_, l)| l.clone());
                (e.name.clone(), levels)
            })
            .collect();
        plots.extend(plot_return_levels(&ctx, &levels)?);
    }
    Ok(plots)
}

//! Defines command-line interface options using `clap` for both tools.

use crate::analysis::AnalysisConfig;
use crate::constants::{
    DEFAULT_AREA, DEFAULT_BASE_DIR, DEFAULT_FETCH_EXPERIMENTS, DEFAULT_FETCH_VARIABLES,
    DEFAULT_MODEL, DEFAULT_OUTPUT_DIR, DEFAULT_RETURN_PERIODS, DEFAULT_SCENARIOS,
    DEFAULT_VARIABLE, HISTORICAL_RANGE, SCENARIO_RANGE,
};
use crate::errors::{CmipVisError, Result};
use crate::retrieval::FetchPlan;
use clap::Parser;
use std::path::PathBuf;

/// Downloads CMIP6 daily projections from the Copernicus Climate Data Store
#[derive(Parser, Debug)]
#[command(
    name = "cmip-fetch",
    version,
    about = "Download CMIP6 projections from the CDS, one archive per experiment and variable"
)]
pub struct FetchArgs {
    /// Variables to download
    #[arg(
        short = 'v',
        long,
        num_args = 1..,
        default_values = DEFAULT_FETCH_VARIABLES
    )]
    pub variables: Vec<String>,

    /// Experiments to download; `historical` uses the historical year range
    #[arg(
        short = 'e',
        long,
        num_args = 1..,
        default_values = DEFAULT_FETCH_EXPERIMENTS
    )]
    pub experiments: Vec<String>,

    /// Bounding box as north west south east
    #[arg(
        long,
        num_args = 4,
        value_names = ["N", "W", "S", "E"],
        allow_negative_numbers = true,
        default_values_t = DEFAULT_AREA
    )]
    pub area: Vec<f64>,

    /// Model identifier on the CDS
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = HISTORICAL_RANGE.0)]
    pub historical_start: i32,

    #[arg(long, default_value_t = HISTORICAL_RANGE.1)]
    pub historical_end: i32,

    #[arg(long, default_value_t = SCENARIO_RANGE.0)]
    pub scenario_start: i32,

    #[arg(long, default_value_t = SCENARIO_RANGE.1)]
    pub scenario_end: i32,

    /// Base directory; files land in `historico/` and `projecao/` below it
    #[arg(long, default_value = DEFAULT_BASE_DIR)]
    pub output_base: PathBuf,

    /// Enable debug logging.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl FetchArgs {
    pub fn into_plan(self) -> Result<FetchPlan> {
        let area: [f64; 4] = self.area.as_slice().try_into().map_err(|_| {
            CmipVisError::ConfigError(format!(
                "--area takes exactly four values (N W S E), got {}",
                self.area.len()
            ))
        })?;
        for (flag, start, end) in [
            ("historical", self.historical_start, self.historical_end),
            ("scenario", self.scenario_start, self.scenario_end),
        ] {
            if start > end {
                return Err(CmipVisError::ConfigError(format!(
                    "--{flag}-start {start} is after --{flag}-end {end}"
                )));
            }
        }

        Ok(FetchPlan {
            variables: self.variables,
            experiments: self.experiments,
            area,
            model: self.model,
            historical_years: (self.historical_start, self.historical_end),
            scenario_years: (self.scenario_start, self.scenario_end),
            output_base: self.output_base,
        })
    }
}

/// Descriptive analysis of downloaded CMIP6 files
#[derive(Parser, Debug)]
#[command(
    name = "cmip-vis",
    version,
    about = "Climatology, anomaly, wind rose and return level charts from CMIP6 files"
)]
pub struct AnalyzeArgs {
    /// Variable to analyse
    #[arg(long, default_value = DEFAULT_VARIABLE)]
    pub variable: String,

    /// Scenario experiments to compare with the historical run
    #[arg(long, num_args = 1.., default_values = DEFAULT_SCENARIOS)]
    pub experiments: Vec<String>,

    /// Historical file, instead of searching the data directory
    #[arg(long)]
    pub historical_file: Option<PathBuf>,

    /// Scenario file override formatted as <experiment>=<path>; repeatable
    #[arg(long = "scenario-file", value_parser = parse_scenario_mapping)]
    pub scenario_files: Vec<(String, PathBuf)>,

    /// Directory holding `historico/` and `projecao/`
    #[arg(long, default_value = DEFAULT_BASE_DIR)]
    pub data_dir: PathBuf,

    /// Directory for the PNG charts
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Return periods in years for the extreme-value chart
    #[arg(long, num_args = 1.., value_parser = parse_return_period, default_values_t = DEFAULT_RETURN_PERIODS.to_vec())]
    pub return_periods: Vec<u32>,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// List the variables and dimensions of the historical file and exit
    #[arg(long)]
    pub list_vars: bool,

    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl AnalyzeArgs {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            variable: self.variable.clone(),
            experiments: self.experiments.clone(),
            historical_file: self.historical_file.clone(),
            scenario_files: self.scenario_files.clone(),
            data_dir: self.data_dir.clone(),
            output_dir: self.output_dir.clone(),
            return_periods: self.return_periods.clone(),
        }
    }
}

/// Parses `<experiment>=<path>`; both sides must be non-empty.
pub fn parse_scenario_mapping(s: &str) -> std::result::Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((experiment, path)) if !experiment.trim().is_empty() && !path.trim().is_empty() => {
            Ok((experiment.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(CmipVisError::InvalidScenarioMapping { item: s.to_string() }.to_string()),
    }
}

pub fn parse_return_period(s: &str) -> std::result::Result<u32, String> {
    let period: u32 = s
        .parse()
        .map_err(|_| format!("Invalid return period '{s}': expected a whole number of years"))?;
    if period <= 1 {
        return Err(CmipVisError::InvalidReturnPeriod(period).to_string());
    }
    Ok(period)
}

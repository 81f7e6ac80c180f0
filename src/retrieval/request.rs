//! Request descriptors and file naming for CDS retrievals

use crate::constants::{experiment_subdir, DATASET, TEMPORAL_RESOLUTION};
use crate::errors::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Body of one CDS retrieval. The dataset selects the endpoint and is not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    #[serde(skip)]
    pub dataset: String,
    pub temporal_resolution: String,
    pub experiment: String,
    pub variable: String,
    pub model: String,
    pub year: Vec<String>,
    pub month: Vec<String>,
    pub day: Vec<String>,
    /// `[north, west, south, east]`
    pub area: [f64; 4],
}

/// Inclusive list of years as strings
pub fn year_list(start: i32, end: i32) -> Vec<String> {
    (start..=end).map(|y| y.to_string()).collect()
}

fn two_digit_range(last: u32) -> Vec<String> {
    (1..=last).map(|n| format!("{n:02}")).collect()
}

pub fn build_request(
    variable: &str,
    experiment: &str,
    years: &[String],
    area: [f64; 4],
    model: &str,
) -> RequestDescriptor {
    RequestDescriptor {
        dataset: DATASET.to_string(),
        temporal_resolution: TEMPORAL_RESOLUTION.to_string(),
        experiment: experiment.to_string(),
        variable: variable.to_string(),
        model: model.to_string(),
        year: years.to_vec(),
        month: two_digit_range(12),
        day: two_digit_range(31),
        area,
    }
}

/// `<experiment>_<variable>_<first>-<last>_<model>.zip`
pub fn target_file_name(experiment: &str, variable: &str, years: &[String], model: &str) -> String {
    let first = years.first().map(String::as_str).unwrap_or_default();
    let last = years.last().map(String::as_str).unwrap_or_default();
    format!("{experiment}_{variable}_{first}-{last}_{model}.zip")
}

/// Creates (if needed) and returns `historico/` or `projecao/` under `base`.
pub fn output_dir_for_experiment(base: &Path, experiment: &str) -> Result<PathBuf> {
    let target = base.join(experiment_subdir(experiment));
    fs::create_dir_all(&target)?;
    Ok(target)
}

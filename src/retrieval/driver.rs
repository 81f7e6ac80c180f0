//! Download loop: one retrieval per (experiment, variable)

use super::client::Retriever;
use super::request::{build_request, output_dir_for_experiment, target_file_name, year_list};
use crate::constants::HISTORICAL;
use crate::errors::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything the fetch tool needs, usually straight from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPlan {
    pub variables: Vec<String>,
    pub experiments: Vec<String>,
    /// `[north, west, south, east]`
    pub area: [f64; 4],
    pub model: String,
    pub historical_years: (i32, i32),
    pub scenario_years: (i32, i32),
    pub output_base: PathBuf,
}

impl FetchPlan {
    /// Year strings for an experiment: the historical range for `historical`,
    /// the scenario range for everything else
    pub fn years_for(&self, experiment: &str) -> Vec<String> {
        let (start, end) = if experiment == HISTORICAL {
            self.historical_years
        } else {
            self.scenario_years
        };
        year_list(start, end)
    }
}

/// Builds the request for one triple, retrieves it into `target_dir` and
/// returns the written path.
pub async fn download_one<R: Retriever + ?Sized>(
    retriever: &R,
    variable: &str,
    experiment: &str,
    years: &[String],
    area: [f64; 4],
    model: &str,
    target_dir: &Path,
) -> Result<PathBuf> {
    let request = build_request(variable, experiment, years, area, model);
    let target_file = target_dir.join(target_file_name(experiment, variable, years, model));
    retriever.retrieve(&request, &target_file).await?;
    Ok(target_file)
}

/// Runs every retrieval of `plan` in order. The first failure stops the
/// loop and is returned; files already written stay on disk.
pub async fn run_fetch<R: Retriever + ?Sized>(plan: &FetchPlan, retriever: &R) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(plan.experiments.len() * plan.variables.len());

    for experiment in &plan.experiments {
        let years = plan.years_for(experiment);
        let target_dir = output_dir_for_experiment(&plan.output_base, experiment)?;
        info!(
            experiment = %experiment,
            years = years.len(),
            dir = %target_dir.display(),
            "Fetching experiment"
        );

        for variable in &plan.variables {
            let target_file = download_one(
                retriever,
                variable,
                experiment,
                &years,
                plan.area,
                &plan.model,
                &target_dir,
            )
            .await?;
            println!("[ok] {experiment} {variable} -> {}", target_file.display());
            written.push(target_file);
        }
    }

    Ok(written)
}

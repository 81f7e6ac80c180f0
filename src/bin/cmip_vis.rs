//! Entry point for `cmip-vis`.
//! Handles CLI parsing, thread pool setup and dispatches to inspection or the full analysis.

use clap::Parser;
use cmip_vis::analysis::run_analysis;
use cmip_vis::cli::AnalyzeArgs;
use cmip_vis::dataset::with_dataset;
use cmip_vis::logging::init_tracing;
use cmip_vis::metadata::list_variables_and_dimensions;
use cmip_vis::parallel::ParallelConfig;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = AnalyzeArgs::parse();
    init_tracing(args.verbose);

    ParallelConfig::new(args.threads).setup_global_pool()?;
    let config = args.analysis_config();

    if args.list_vars {
        let path = config.historical_path()?;
        println!("File: {}", path.display());
        with_dataset(&path, |dataset| list_variables_and_dimensions(dataset.file()))?;
        return Ok(());
    }

    let report = run_analysis(&config)?;
    info!(
        variable = %report.variable,
        scenarios = report.scenarios.len(),
        charts = report.plots.len(),
        "Analysis complete"
    );
    Ok(())
}

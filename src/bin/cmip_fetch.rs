//! Entry point for `cmip-fetch`.
//! Parses the plan from the command line and downloads every (experiment, variable) pair.

use anyhow::Context;
use clap::Parser;
use cmip_vis::cli::FetchArgs;
use cmip_vis::logging::init_tracing;
use cmip_vis::retrieval::{run_fetch, CdsClient, CdsConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = FetchArgs::parse();
    init_tracing(args.verbose);

    let plan = args.into_plan()?;
    let config = CdsConfig::from_env().context("CDS credentials")?;
    info!(url = %config.url, model = %plan.model, "Using CDS endpoint");
    let client = CdsClient::new(config)?;

    let written = run_fetch(&plan, &client).await?;
    info!(files = written.len(), "Downloads complete");
    Ok(())
}

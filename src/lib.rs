//! cmip_vis: CMIP6 retrieval and descriptive climate charts
//!
//! A Rust library and two command-line tools for working with CMIP6 daily
//! projections from the Copernicus Climate Data Store (CDS). `cmip-fetch`
//! downloads one archive per (experiment, variable); `cmip-vis` reduces the
//! downloaded NetCDF files to spatial-mean time series and charts them against
//! the historical baseline.
//!
//! ## Key Features
//!
//! - **Retrieval**: Request building, file naming and a minimal CDS API client
//! - **Transparent archives**: Zipped NetCDF downloads open like plain files
//! - **Variable aliases**: Canonical names resolve to provider-specific names
//! - **CF time decoding**: Gregorian, noleap, all_leap and 360_day calendars
//! - **Statistics**: Monthly climatology, annual aggregates, anomalies, GEV return levels
//! - **Charts**: PNG output rendered from SVG with resvg
//!
//! ## Module Organization
//!
//! - [`retrieval`]: Request descriptors, the CDS client and the download loop
//! - [`locate`]: Finding downloaded files by experiment and variable
//! - [`dataset`]: Opening NetCDF files and zip archives
//! - [`series`]: Variable resolution, CF decoding and spatial means
//! - [`time`]: CF time coordinates and calendars
//! - [`aggregation`] and [`anomaly`]: Temporal resampling and baseline differences
//! - [`wind`] and [`extremes`]: Wind direction, wind roses and return levels
//! - [`render`]: Chart composition and rasterization
//! - [`analysis`]: The end-to-end analysis driver
//! - [`metadata`]: NetCDF file inspection
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cmip_vis::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> cmip_vis::Result<()> {
//!     let series = load_series(Path::new("date/historico/historical_tas.zip"), "tas")?;
//!     let climatology = monthly_climatology(&series, AggMethod::Mean);
//!     for (month, value) in climatology.iter() {
//!         println!("{month:02}: {value:.2}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod analysis;
pub mod anomaly;
pub mod cli;
pub mod constants;
pub mod dataset;
pub mod errors;
pub mod extremes;
pub mod locate;
pub mod logging;
pub mod metadata;
pub mod parallel;
pub mod render;
pub mod retrieval;
pub mod series;
pub mod time;
pub mod wind;

pub use errors::{CmipVisError, Result};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::aggregation::{
        annual_aggregate, annual_max, monthly_aggregate, monthly_climatology, AggMethod,
        AnnualSeries, MonthlyClimatology,
    };
    pub use crate::analysis::{run_analysis, AnalysisConfig, AnalysisReport};
    pub use crate::anomaly::{annual_anomaly, monthly_anomaly};
    pub use crate::dataset::{with_dataset, OpenedDataset};
    pub use crate::errors::{CmipVisError, Result};
    pub use crate::extremes::{compute_return_levels, ReturnLevels};
    pub use crate::locate::find_file;
    pub use crate::parallel::ParallelConfig;
    pub use crate::retrieval::{run_fetch, CdsClient, CdsConfig, FetchPlan, Retriever};
    pub use crate::series::{load_series, TimeSeries};
    pub use crate::wind::load_wind_direction;
}

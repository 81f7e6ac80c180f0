//! CMIP6 retrieval from the Climate Data Store
//!
//! # Organization
//!
//! - [`request`]: request descriptors, year lists and output naming
//! - [`client`]: the CDS HTTP client and the [`Retriever`] seam
//! - [`driver`]: the download loop over experiments and variables

pub mod client;
pub mod driver;
pub mod request;

pub use client::{CdsClient, CdsConfig, PollSchedule, Retriever};
pub use driver::{download_one, run_fetch, FetchPlan};
pub use request::{
    build_request, output_dir_for_experiment, target_file_name, year_list, RequestDescriptor,
};

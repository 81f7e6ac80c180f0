//! Centralized error handling for cmip_vis
//!
//! Every fallible operation in the library returns [`Result`], so the binaries
//! can propagate failures with `?` and report them once at exit.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cmip_vis operations
#[derive(Debug, Error)]
pub enum CmipVisError {
    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Zip archive errors
    #[error("Zip archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// HTTP errors from the CDS retrieval client
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON encoding or decoding errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),

    /// Variable not found in NetCDF file
    #[error("Variable '{var}' not found in {file}. Available: {}", available.join(", "))]
    VariableNotFound {
        var: String,
        file: String,
        available: Vec<String>,
    },

    /// Dimension not found in variable
    #[error("Dimension '{dim}' not found in variable '{var}'")]
    DimensionNotFound { var: String, dim: String },

    /// The variable still has non-time axes after the spatial mean
    #[error("Variable '{var}' has unsupported dimensions {dims:?}; expected time plus latitude/longitude")]
    UnsupportedShape { var: String, dims: Vec<String> },

    /// Zip archive without a NetCDF member
    #[error("No .nc member inside archive: {}", path.display())]
    NoNetcdfInArchive { path: PathBuf },

    /// Historical input could not be located
    #[error("Historical file not found. Use --historical-file or download it into {}", dir.display())]
    HistoricalFileNotFound { dir: PathBuf },

    /// None of the requested scenarios had an input file
    #[error("No scenario file found")]
    NoScenarioFiles,

    /// Malformed `experiment=path` mapping
    #[error("Invalid --scenario-file value '{item}'. Use experiment=file.nc")]
    InvalidScenarioMapping { item: String },

    /// CF time coordinate could not be decoded
    #[error("Time decoding error: {0}")]
    TimeDecode(String),

    /// Not enough finite values for an extreme-value fit
    #[error("Series too short to estimate extremes: {found} finite values, at least {required} required")]
    SeriesTooShort { found: usize, required: usize },

    /// Extreme-value fit did not produce usable parameters
    #[error("GEV fit failed: {0}")]
    FitFailed(String),

    /// Return periods must exceed one year
    #[error("Invalid return period {0}: must be greater than 1")]
    InvalidReturnPeriod(u32),

    /// CDS credentials or client setup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The CDS API answered with an error status
    #[error("CDS API returned {status}: {detail}")]
    ApiError { status: u16, detail: String },

    /// The remote job ended without a result
    #[error("CDS job {job_id} ended with status '{status}'{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    RemoteJobFailed {
        job_id: String,
        status: String,
        message: Option<String>,
    },

    /// Chart composition or rasterization errors
    #[error("Render error: {0}")]
    RenderError(String),

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

/// Result type alias for cmip_vis operations
pub type Result<T> = std::result::Result<T, CmipVisError>;

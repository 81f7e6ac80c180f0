//! Rayon thread pool configuration for the spatial reductions

use crate::errors::{CmipVisError, Result};
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Set up the global Rayon thread pool with the configured size
    pub fn setup_global_pool(&self) -> Result<()> {
        match self.num_threads {
            Some(num_threads) => {
                ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build_global()
                    .map_err(|e| {
                        CmipVisError::ThreadPoolError(format!(
                            "Failed to initialize thread pool with {num_threads} threads: {e}"
                        ))
                    })?;
                info!(threads = num_threads, "Configured parallel processing");
            }
            None => debug!(
                threads = rayon::current_num_threads(),
                cores = num_cpus::get(),
                "Using default thread pool configuration"
            ),
        }
        Ok(())
    }
}

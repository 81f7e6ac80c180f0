//! Minimal client for the CDS retrieve API
//!
//! A retrieval is three steps: submit the request as a job, poll the job
//! until it finishes, then stream the result asset to disk. There is no retry;
//! the first failure is returned to the caller.

use super::request::RequestDescriptor;
use crate::errors::{CmipVisError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

pub const DEFAULT_CDS_URL: &str = "https://cds.climate.copernicus.eu/api";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Fetch-and-save operation used by the download driver
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve `request` and write the result to `target`
    async fn retrieve(&self, request: &RequestDescriptor, target: &Path) -> Result<()>;
}

/// Endpoint and API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdsConfig {
    pub url: String,
    pub key: String,
}

impl CdsConfig {
    /// `CDSAPI_URL`/`CDSAPI_KEY` from the environment, falling back to the
    /// rc file (`CDSAPI_RC`, default `~/.cdsapirc`) for whatever is unset.
    pub fn from_env() -> Result<Self> {
        let env_url = env::var("CDSAPI_URL").ok().filter(|v| !v.is_empty());
        let env_key = env::var("CDSAPI_KEY").ok().filter(|v| !v.is_empty());
        if let (Some(url), Some(key)) = (&env_url, &env_key) {
            return Ok(Self {
                url: url.clone(),
                key: key.clone(),
            });
        }

        let rc_path = env::var_os("CDSAPI_RC")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".cdsapirc")))
            .ok_or_else(|| {
                CmipVisError::ConfigError(
                    "CDSAPI_URL/CDSAPI_KEY are not set and no home directory was found".to_string(),
                )
            })?;
        let from_file = Self::from_rc_file(&rc_path)?;

        Ok(Self {
            url: env_url.unwrap_or(from_file.url),
            key: env_key.unwrap_or(from_file.key),
        })
    }

    pub fn from_rc_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CmipVisError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse_rc(&contents)
            .ok_or_else(|| CmipVisError::ConfigError(format!("no key in {}", path.display())))
    }

    /// Parses `url: ...` / `key: ...` lines. The url defaults to
    /// [`DEFAULT_CDS_URL`]; a missing key yields `None`.
    pub fn parse_rc(contents: &str) -> Option<Self> {
        let mut url = None;
        let mut key = None;
        for line in contents.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            match name.trim() {
                "url" => url = Some(value),
                "key" => key = Some(value),
                _ => {}
            }
        }
        Some(Self {
            url: url.unwrap_or_else(|| DEFAULT_CDS_URL.to_string()),
            key: key.filter(|k| !k.is_empty())?,
        })
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    #[serde(rename = "jobID")]
    job_id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct JobResults {
    asset: Asset,
}

#[derive(Debug, Deserialize)]
struct Asset {
    value: AssetValue,
}

#[derive(Debug, Deserialize)]
struct AssetValue {
    href: String,
    #[serde(rename = "file:size", default)]
    size: Option<u64>,
}

/// Backoff between status polls
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub initial: Duration,
    pub max: Duration,
    pub factor: f64,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
            factor: 1.5,
        }
    }
}

impl PollSchedule {
    fn next(&self, current: Duration) -> Duration {
        current.mul_f64(self.factor).min(self.max)
    }
}

/// HTTP client for the CDS retrieve API
pub struct CdsClient {
    client: Client,
    config: CdsConfig,
    poll: PollSchedule,
}

impl CdsClient {
    pub fn new(config: CdsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cmip_vis/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            config,
            poll: PollSchedule::default(),
        })
    }

    /// Replaces the default backoff between status polls
    pub fn with_poll_schedule(mut self, poll: PollSchedule) -> Self {
        self.poll = poll;
        self
    }

    async fn submit(&self, request: &RequestDescriptor) -> Result<JobStatus> {
        let url = format!(
            "{}/retrieve/v1/processes/{}/execution",
            self.config.base(),
            request.dataset
        );
        let body = serde_json::json!({ "inputs": serde_json::to_value(request)? });
        debug!(%url, body = %body, "Submitting request");

        let response = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, &self.config.key)
            .json(&body)
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus> {
        let url = format!("{}/retrieve/v1/jobs/{job_id}", self.config.base());
        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.config.key)
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }

    async fn results(&self, job_id: &str) -> Result<Response> {
        let url = format!("{}/retrieve/v1/jobs/{job_id}/results", self.config.base());
        Ok(self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.config.key)
            .send()
            .await?)
    }

    /// Polls until the job succeeds; a failed, rejected or dismissed job is an error.
    async fn wait_for(&self, mut job: JobStatus) -> Result<String> {
        let mut delay = self.poll.initial;
        loop {
            match job.status.as_str() {
                "successful" => return Ok(job.job_id),
                "failed" | "rejected" | "dismissed" => {
                    let message = match self.results(&job.job_id).await {
                        Ok(response) => response.text().await.ok().filter(|t| !t.is_empty()),
                        Err(_) => None,
                    };
                    return Err(CmipVisError::RemoteJobFailed {
                        job_id: job.job_id,
                        status: job.status,
                        message,
                    });
                }
                other => debug!(job = %job.job_id, status = other, "Waiting for job"),
            }
            tokio::time::sleep(delay).await;
            delay = self.poll.next(delay);
            job = self.status(&job.job_id).await?;
        }
    }

    /// Streams `href` to `<target>.partial`, then renames it into place.
    /// The partial file is removed on any failure.
    async fn download(&self, href: &str, target: &Path, expected: Option<u64>) -> Result<u64> {
        let partial = target.with_extension("partial");
        let response = checked(self.client.get(href).send().await?).await?;

        match stream_to(response, &partial, expected).await {
            Ok(written) => {
                tokio::fs::rename(&partial, target).await?;
                Ok(written)
            }
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    debug!(path = %partial.display(), error = %cleanup, "No partial file to remove");
                }
                Err(err)
            }
        }
    }
}

async fn stream_to(response: Response, partial: &Path, expected: Option<u64>) -> Result<u64> {
    let mut out = tokio::fs::File::create(partial).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    out.flush().await?;

    match expected {
        Some(expected) if expected != written => Err(CmipVisError::ApiError {
            status: 200,
            detail: format!("incomplete download: got {written} of {expected} bytes"),
        }),
        _ => Ok(written),
    }
}

#[async_trait]
impl Retriever for CdsClient {
    #[instrument(skip(self, request), fields(experiment = %request.experiment, variable = %request.variable))]
    async fn retrieve(&self, request: &RequestDescriptor, target: &Path) -> Result<()> {
        let job = self.submit(request).await?;
        info!(job = %job.job_id, status = %job.status, "Request accepted");

        let job_id = self.wait_for(job).await?;
        let results: JobResults = checked(self.results(&job_id).await?).await?.json().await?;

        let bytes = self
            .download(&results.asset.value.href, target, results.asset.value.size)
            .await?;
        info!(job = %job_id, bytes, path = %target.display(), "Downloaded result");
        Ok(())
    }
}

/// Turns a non-success response into [`CmipVisError::ApiError`] carrying the body.
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(CmipVisError::ApiError {
        status: status.as_u16(),
        detail,
    })
}

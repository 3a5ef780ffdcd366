//! Client for Firecrawl's extract API.
//!
//! Extraction is an asynchronous job on the provider side: the job is
//! submitted, then its status is polled until it completes or fails.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::extract::ExtractJob;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request to extraction provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extraction provider returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Extraction job failed: {0}")]
    JobFailed(String),

    #[error("Unexpected response from extraction provider: {0}")]
    InvalidResponse(String),

    #[error("Extraction job {job_id} still pending after {waited:?}")]
    JobTimedOut { job_id: String, waited: Duration },
}

/// How a failed send may be retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Retry {
    /// Only when the connection was never established.
    ConnectOnly,
    /// Also after a timeout; the request must be safe to repeat.
    ConnectOrTimeout,
}

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(90);

/// Anything that can turn an [`ExtractJob`] into the provider's JSON output.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, job: &ExtractJob) -> Result<Value, ProviderError>;
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    data: Option<Value>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    success: bool,
    status: Option<String>,
    data: Option<Value>,
    error: Option<String>,
}

pub struct FirecrawlClient {
    client: Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    /// Longest time spent polling one job before giving up.
    max_wait: Duration,
}

fn build_http_client(request_timeout: Duration) -> Result<Client, ProviderError> {
    Ok(ClientBuilder::new()
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()?)
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, poll_interval: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(DEFAULT_REQUEST_TIMEOUT)?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval,
            max_wait: DEFAULT_MAX_WAIT,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Ok(Self::new(
            config.firecrawl_api_key.clone(),
            config.firecrawl_api_url.clone(),
            config.poll_interval,
        )?
        .with_max_wait(config.extract_timeout))
    }

    /// Per-request timeout for each call to the provider.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self, ProviderError> {
        self.client = build_http_client(timeout)?;
        Ok(self)
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    async fn submit(&self, job: &ExtractJob) -> Result<SubmitResponse, ProviderError> {
        let url = format!("{}/v1/extract", self.base_url);
        let res = send_with_retry(Retry::ConnectOnly, || {
            self.client.post(&url).bearer_auth(&self.api_key).json(job)
        })
        .await?;
        let res = check_status(res).await?;
        Ok(res.json().await?)
    }

    async fn status(&self, id: &str) -> Result<StatusResponse, ProviderError> {
        let url = format!("{}/v1/extract/{}", self.base_url, id);
        let res = send_with_retry(Retry::ConnectOrTimeout, || {
            self.client.get(&url).bearer_auth(&self.api_key)
        })
        .await?;
        let res = check_status(res).await?;
        Ok(res.json().await?)
    }
}

#[async_trait]
impl Extractor for FirecrawlClient {
    async fn extract(&self, job: &ExtractJob) -> Result<Value, ProviderError> {
        tracing::debug!(urls = job.urls.len(), "Submitting extraction job");
        let submitted = self.submit(job).await?;

        if !submitted.success {
            return Err(ProviderError::JobFailed(
                submitted.error.unwrap_or_else(|| "job was rejected".to_string()),
            ));
        }

        // Some deployments answer synchronously
        if let Some(data) = submitted.data {
            return Ok(data);
        }

        let id = submitted
            .id
            .ok_or_else(|| ProviderError::InvalidResponse("missing job id".to_string()))?;
        tracing::info!(job_id = %id, "Extraction job accepted");

        let started = tokio::time::Instant::now();
        loop {
            let status = self.status(&id).await?;
            if !status.success {
                return Err(ProviderError::JobFailed(
                    status.error.unwrap_or_else(|| "status check was rejected".to_string()),
                ));
            }

            let state = status.status.unwrap_or_default();
            match state.as_str() {
                "completed" => {
                    tracing::info!(job_id = %id, "Extraction job completed");
                    return status
                        .data
                        .ok_or_else(|| ProviderError::InvalidResponse("completed job has no data".to_string()));
                }
                "failed" | "cancelled" => {
                    let reason = status.error.unwrap_or_else(|| format!("job {}", state));
                    tracing::warn!(job_id = %id, %reason, "Extraction job did not complete");
                    return Err(ProviderError::JobFailed(reason));
                }
                other => {
                    let waited = started.elapsed();
                    if waited >= self.max_wait {
                        tracing::warn!(job_id = %id, ?waited, "Giving up on extraction job");
                        return Err(ProviderError::JobTimedOut { job_id: id, waited });
                    }
                    tracing::debug!(job_id = %id, status = other, "Extraction job pending");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

/// Sends a request, retrying once when the failure looks transient.
async fn send_with_retry<F>(retry: Retry, build: F) -> Result<Response, ProviderError>
where
    F: Fn() -> RequestBuilder,
{
    match build().send().await {
        Ok(res) => Ok(res),
        Err(err) if is_retryable(retry, &err) => {
            tracing::warn!(error = %err, "Transient provider error, retrying once");
            Ok(build().send().await?)
        }
        Err(err) => Err(err.into()),
    }
}

fn is_retryable(retry: Retry, err: &reqwest::Error) -> bool {
    match retry {
        Retry::ConnectOnly => err.is_connect(),
        Retry::ConnectOrTimeout => err.is_connect() || err.is_timeout(),
    }
}

async fn check_status(res: Response) -> Result<Response, ProviderError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    // Firecrawl reports failures as {"success": false, "error": "..."}
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);

    Err(ProviderError::Api { status, message })
}

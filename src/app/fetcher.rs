//! Single-page image fetching
//!
//! One fetch retrieves one page image with a fixed timeout and classifies
//! the outcome. Nothing here raises for a bad page: timeouts, connection
//! errors, and non-2xx statuses all become a [`FetchOutcome::Failure`]
//! carrying a readable reason plus the (chapter, page) coordinates for
//! logging. Retry policy, if any, belongs to the caller; none is
//! implemented here.
//!
//! Successful fetches persist their bytes under a deterministic
//! per-(chapter, page) filename inside the run's asset directory, so
//! re-fetching a page is idempotent (last write wins).

use std::future::Future;
use std::path::PathBuf;

use tracing::{debug, warn};
use url::Url;

use crate::constants::http;
use crate::errors::ConfigResult;

/// One unit of fetch work: a page location within a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJob {
    /// Chapter number the page belongs to
    pub chapter: u32,
    /// 1-based page index within the chapter
    pub page: u32,
    /// Source URL of the page image
    pub url: String,
}

/// What happened to one page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Bytes persisted to this local path
    Success(PathBuf),
    /// The page could not be retrieved; reason is human-readable
    Failure(String),
}

/// Transient record produced by a fetch, consumed once by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Chapter number of the attempted page
    pub chapter: u32,
    /// Page index of the attempted page
    pub page: u32,
    /// Success or named failure
    pub outcome: FetchOutcome,
}

impl FetchResult {
    /// A successful fetch persisted at `path`
    pub fn success(chapter: u32, page: u32, path: PathBuf) -> Self {
        Self {
            chapter,
            page,
            outcome: FetchOutcome::Success(path),
        }
    }

    /// A failed fetch with a readable reason
    pub fn failure(chapter: u32, page: u32, reason: impl Into<String>) -> Self {
        Self {
            chapter,
            page,
            outcome: FetchOutcome::Failure(reason.into()),
        }
    }
}

/// Source of page images
///
/// The seam between the coordinator and the network. The production
/// implementation is [`HttpPageFetcher`]; tests substitute a scripted
/// source to drive completion order and failures deterministically.
pub trait PageSource: Send + Sync + 'static {
    /// Fetch one page and persist it at `dest`, classifying the outcome
    fn fetch_page(
        &self,
        job: PageJob,
        dest: PathBuf,
    ) -> impl Future<Output = FetchResult> + Send;
}

/// HTTP page fetcher with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Build the fetcher and its HTTP client
    pub fn new() -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(http::USER_AGENT)
            .timeout(http::FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn try_fetch(client: reqwest::Client, job: &PageJob, dest: &PathBuf) -> Result<(), String> {
        let url = Url::parse(&job.url).map_err(|e| format!("invalid URL {}: {e}", job.url))?;

        let response = client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(describe_request_error)?;

        let bytes = response.bytes().await.map_err(describe_request_error)?;

        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| format!("failed to write {}: {e}", dest.display()))?;
        Ok(())
    }
}

impl PageSource for HttpPageFetcher {
    fn fetch_page(
        &self,
        job: PageJob,
        dest: PathBuf,
    ) -> impl Future<Output = FetchResult> + Send {
        let client = self.client.clone();
        async move {
            match Self::try_fetch(client, &job, &dest).await {
                Ok(()) => {
                    debug!(chapter = job.chapter, page = job.page, "downloaded page");
                    FetchResult::success(job.chapter, job.page, dest)
                }
                Err(reason) => {
                    warn!(
                        chapter = job.chapter,
                        page = job.page,
                        %reason,
                        "page download failed"
                    );
                    FetchResult::failure(job.chapter, job.page, reason)
                }
            }
        }
    }
}

/// Map a reqwest error to the failure-reason wording used in logs
fn describe_request_error(error: reqwest::Error) -> String {
    if error.is_timeout() {
        format!(
            "timed out after {} seconds",
            http::FETCH_TIMEOUT.as_secs()
        )
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else if let Some(status) = error.status() {
        format!("server returned HTTP {status}")
    } else {
        error.to_string()
    }
}

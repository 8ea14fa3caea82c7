//! Page fetcher for partner listings, remote or saved to disk.

mod location;

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use location::{page_key, parse_location, resolve_link};

/// HTTP client for bank partner listing pages.
///
/// `file://` URLs are read from disk instead of being requested, so a saved
/// capture of a listing goes through the same extraction path as a live page.
///
/// Transient errors (network failures, 429, 5xx) are retried with
/// exponential backoff up to `max_retries` additional attempts. Cloning is
/// cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ListingClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in milliseconds: `backoff_base_ms * 2^(retry - 1)`.
    backoff_base_ms: u64,
}

impl ListingClient {
    /// Creates a `ListingClient` with the configured timeout, `User-Agent`, and
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches one listing page and returns its HTML.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: other non-2xx (5xx retried, 4xx not).
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    /// - [`ScraperError::SourceIo`]: a local capture could not be read.
    /// - [`ScraperError::EmptySource`]: the document is blank.
    pub async fn fetch_page(&self, url: &Url) -> Result<String, ScraperError> {
        let body = if url.scheme() == "file" {
            read_capture(url).await?
        } else {
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.fetch_remote(url)
            })
            .await?
        };

        if body.trim().is_empty() {
            return Err(ScraperError::EmptySource {
                url: url.to_string(),
            });
        }
        Ok(body)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "az,en;q=0.8,ru;q=0.6")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScraperError::RateLimited {
                url: url.to_string(),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

async fn read_capture(url: &Url) -> Result<String, ScraperError> {
    let path = url.to_file_path().map_err(|()| ScraperError::InvalidUrl {
        url: url.to_string(),
        reason: "file URL does not map to a local path".to_owned(),
    })?;
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ScraperError::SourceIo {
            path: path.display().to_string(),
            source: e,
        })
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid source URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to read local capture {path}: {source}")]
    SourceIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("source document at {url} is empty")]
    EmptySource { url: String },

    #[error("invalid selector for {source_name}.{field}: {reason}")]
    InvalidSelector {
        source_name: String,
        field: String,
        reason: String,
    },

    #[error("prefetch of {url} did not complete: {reason}")]
    FetchTask { url: String, reason: String },
}

impl ScraperError {
    /// Errors that mean the source itself is unusable rather than one page
    /// being unavailable.
    #[must_use]
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            ScraperError::InvalidUrl { .. }
                | ScraperError::SourceIo { .. }
                | ScraperError::EmptySource { .. }
                | ScraperError::InvalidSelector { .. }
        )
    }
}

use std::time::Duration;
use thiserror::Error;

/// Failures that can occur while scraping a single source.
///
/// None of these reach the caller of [`crate::Aggregator::search`]; the
/// aggregator turns each one into an empty contribution plus a
/// [`crate::results::SourceReport`].
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    /// The browser-automation endpoint is missing or unreachable
    #[error("connection error: {0}")]
    Connection(String),

    /// The page failed to load
    #[error("navigation error: {0}")]
    Navigation(String),

    /// An operation ran past its time budget
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// DOM query or parse failure; recovered inside the extractor
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The source declaration itself is unusable (bad template, bad URL)
    #[error("invalid source: {0}")]
    InvalidSource(String),
}

impl ScrapeError {
    /// Short tag used in per-source reports
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Connection(_) => "connection",
            ScrapeError::Navigation(_) => "navigation",
            ScrapeError::Timeout(_) => "timeout",
            ScrapeError::Extraction(_) => "extraction",
            ScrapeError::InvalidSource(_) => "invalid_source",
        }
    }
}

impl From<fantoccini::error::CmdError> for ScrapeError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        ScrapeError::Navigation(err.to_string())
    }
}

/// Errors raised while loading a [`crate::config::ScraperConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

use crate::error::ConfigError;
use crate::sources::{MAX_TIMEOUT_SECS, SourceSpec, default_sources};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides the configured WebDriver endpoint
pub const WEBDRIVER_URL_ENV: &str = "WEBDRIVER_URL";

/// Largest accepted `max_concurrency`
pub const MAX_CONCURRENCY: usize = 32;

/// Configuration for the scraper, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL of the remote WebDriver endpoint; scraping is unavailable without it
    #[serde(default)]
    pub webdriver_url: Option<String>,

    /// Whether to ask the remote browser to run headless
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Bound on establishing a session
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Bound on waiting for a result selector once the page has loaded
    #[serde(default = "default_selector_wait_ms")]
    pub selector_wait_ms: u64,

    /// Delay between selector probes while waiting
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of items taken from one source
    #[serde(default = "default_max_items_per_source")]
    pub max_items_per_source: usize,

    /// Titles shorter than this are treated as page chrome and skipped
    #[serde(default = "default_min_title_chars")]
    pub min_title_chars: usize,

    /// Summaries are cut to this many characters
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,

    /// Number of sources scraped at once; 1 means strictly sequential
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Source table, in output order
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSpec>,
}

fn default_headless() -> bool {
    true
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_selector_wait_ms() -> u64 {
    8_000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_max_items_per_source() -> usize {
    5
}

fn default_min_title_chars() -> usize {
    5
}

fn default_summary_max_chars() -> usize {
    300
}

fn default_max_concurrency() -> usize {
    1
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: None,
            headless: default_headless(),
            connect_timeout_secs: default_connect_timeout_secs(),
            selector_wait_ms: default_selector_wait_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_items_per_source: default_max_items_per_source(),
            min_title_chars: default_min_title_chars(),
            summary_max_chars: default_summary_max_chars(),
            max_concurrency: default_max_concurrency(),
            sources: default_sources(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WEBDRIVER_URL` if it is set and non-empty
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(WEBDRIVER_URL_ENV).ok();
        self.with_webdriver_override(value)
    }

    fn with_webdriver_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.map(|v| v.trim().to_string()) {
            if !url.is_empty() {
                self.webdriver_url = Some(url);
            }
        }
        self
    }

    /// Reject settings that would make every scrape fail or hang
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_items_per_source == 0 {
            return Err(ConfigError::Invalid(
                "max_items_per_source must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "connect_timeout_secs must be between 1 and {}",
                MAX_TIMEOUT_SECS
            )));
        }
        if self.max_concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "max_concurrency must be at most {}",
                MAX_CONCURRENCY
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            source
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            if self.selector_wait_ms >= source.timeout_secs.saturating_mul(1_000) {
                return Err(ConfigError::Invalid(format!(
                    "selector_wait_ms must be shorter than the {} navigation timeout",
                    source.id
                )));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate source id {}",
                    source.id
                )));
            }
        }
        Ok(())
    }

    /// The endpoint address, if one is configured and non-empty
    pub fn endpoint(&self) -> Option<&str> {
        self.webdriver_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn selector_wait(&self) -> Duration {
        Duration::from_millis(self.selector_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

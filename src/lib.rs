//! Clinical-resource aggregation scraper.
//!
//! Drives a remote browser over WebDriver to search several clinical
//! guidance sites (NICE, NHS, CSP), maps each site's result markup onto one
//! [`ExtractedItem`] schema and returns whatever the sources yield. A source
//! that fails contributes nothing; the search as a whole never fails.
//!
//! ```no_run
//! use clinical_scrape::{Aggregator, ScraperConfig};
//!
//! # async fn run() {
//! let config = ScraperConfig::default().with_env_overrides();
//! let aggregator = Aggregator::from_config(&config);
//! let response = aggregator.search("back pain").await;
//! println!("{} resources", response.resources.len());
//! # }
//! ```

pub mod aggregator;
pub mod browser;
pub mod config;
pub mod error;
pub mod extractor;
pub mod parsers;
pub mod results;
pub mod sources;
pub mod utils;

// Re-export commonly used types for convenience
pub use aggregator::Aggregator;
pub use config::ScraperConfig;
pub use error::{ConfigError, ScrapeError};
pub use results::{AggregateResult, ExtractedItem, SearchResponse, SourceReport};
pub use sources::{ScrapeQuery, SourceSpec};

/// Search with a one-off aggregator built from `config`
pub async fn search(config: &ScraperConfig, query: &str) -> SearchResponse {
    Aggregator::from_config(config).search(query).await
}

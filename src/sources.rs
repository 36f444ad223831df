use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Placeholder substituted with the encoded query in a source's URL template
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Upper bound accepted for any configured timeout, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// A raw search term, treated as opaque text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeQuery(String);

impl ScrapeQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Form-encoded form of the query, suitable for a query-string value
    pub fn encoded(&self) -> String {
        url::form_urlencoded::byte_serialize(self.0.as_bytes()).collect()
    }
}

impl std::fmt::Display for ScrapeQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static declaration of one external source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Stable identifier, copied into every item as `source`
    pub id: String,

    /// Fixed label copied into every item as `type`
    pub category: String,

    /// Search URL containing a single `{query}` placeholder
    pub url_template: String,

    /// Result-container selectors, tried in order; the first that matches wins
    pub result_selectors: Vec<String>,

    /// Title selectors tried in order inside each container
    #[serde(default = "default_title_selectors")]
    pub title_selectors: Vec<String>,

    /// Summary selectors tried in order inside each container
    #[serde(default = "default_summary_selectors")]
    pub summary_selectors: Vec<String>,

    /// Hard bound on page navigation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_title_selectors() -> Vec<String> {
    strings(&["h2 a", "h3 a", "h2", "h3", "a"])
}

fn default_summary_selectors() -> Vec<String> {
    strings(&["p"])
}

fn default_timeout_secs() -> u64 {
    30
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl SourceSpec {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the search URL for `query`
    pub fn build_url(&self, query: &ScrapeQuery) -> Result<Url, ScrapeError> {
        self.validate()?;

        let raw = self
            .url_template
            .replace(QUERY_PLACEHOLDER, &query.encoded());
        Url::parse(&raw)
            .map_err(|e| ScrapeError::InvalidSource(format!("{}: {} ({})", self.id, raw, e)))
    }

    /// Check the declaration is usable
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.id.trim().is_empty() {
            return Err(ScrapeError::InvalidSource(
                "source id must not be empty".to_string(),
            ));
        }

        let placeholders = self.url_template.matches(QUERY_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(ScrapeError::InvalidSource(format!(
                "{}: url template must contain exactly one {} placeholder, found {}",
                self.id, QUERY_PLACEHOLDER, placeholders
            )));
        }

        if !(self.url_template.starts_with("https://") || self.url_template.starts_with("http://"))
        {
            return Err(ScrapeError::InvalidSource(format!(
                "{}: url template must be an http(s) URL",
                self.id
            )));
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ScrapeError::InvalidSource(format!(
                "{}: timeout_secs must be between 1 and {}, got {}",
                self.id, MAX_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        if self.result_selectors.is_empty() {
            return Err(ScrapeError::InvalidSource(format!(
                "{}: at least one result selector is required",
                self.id
            )));
        }

        Ok(())
    }
}

/// The built-in source table: NICE guidance, NHS health information and
/// CSP professional guidance, in that order.
pub fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec {
            id: "NICE".to_string(),
            category: "Guideline".to_string(),
            url_template: "https://www.nice.org.uk/search?q={query}".to_string(),
            result_selectors: strings(&[
                ".search-results li",
                "[data-component='search-results'] li",
                "ol.results > li",
                "article.card",
            ]),
            title_selectors: strings(&["h3 a", "h2 a", ".card__heading a", "a"]),
            summary_selectors: strings(&["p", ".card__summary", ".search-result__summary"]),
            timeout_secs: 30,
        },
        SourceSpec {
            id: "NHS".to_string(),
            category: "Health Info".to_string(),
            url_template: "https://www.nhs.uk/search/results?q={query}".to_string(),
            result_selectors: strings(&[
                ".nhsuk-list li",
                "ul.nhsuk-list-panel__list li",
                ".search-results li",
                "article",
            ]),
            title_selectors: strings(&["h2 a", "h3 a", "a"]),
            summary_selectors: strings(&["p", ".nhsuk-body-s"]),
            timeout_secs: 30,
        },
        SourceSpec {
            id: "CSP".to_string(),
            category: "Professional Guidance".to_string(),
            url_template: "https://www.csp.org.uk/search?keywords={query}".to_string(),
            result_selectors: strings(&[
                ".search-result",
                ".view-content .views-row",
                "ol.search-results li",
                "article",
            ]),
            title_selectors: strings(&["h3 a", "h2 a", ".field--name-title a", "a"]),
            summary_selectors: strings(&[".search-snippet", ".field--name-body", "p"]),
            timeout_secs: 30,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_are_valid_and_ordered() {
        let sources = default_sources();
        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["NICE", "NHS", "CSP"]);

        for source in &sources {
            assert!(source.validate().is_ok(), "{} should validate", source.id);
        }
    }

    #[test]
    fn test_build_url_encodes_query() {
        let nice = &default_sources()[0];
        let url = nice.build_url(&ScrapeQuery::new("back pain")).unwrap();
        assert_eq!(url.as_str(), "https://www.nice.org.uk/search?q=back+pain");

        let url = nice.build_url(&ScrapeQuery::new("knee & hip")).unwrap();
        assert_eq!(url.query(), Some("q=knee+%26+hip"));
    }

    #[test]
    fn test_build_url_rejects_missing_placeholder() {
        let mut spec = default_sources().remove(0);
        spec.url_template = "https://www.nice.org.uk/search".to_string();

        let err = spec.build_url(&ScrapeQuery::new("x")).unwrap_err();
        assert_eq!(err.kind(), "invalid_source");
    }

    #[test]
    fn test_build_url_rejects_duplicate_placeholder() {
        let mut spec = default_sources().remove(0);
        spec.url_template = "https://example.com/{query}?q={query}".to_string();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let spec: SourceSpec = serde_json::from_str(
            r#"{
                "id": "TEST",
                "category": "Guideline",
                "url_template": "https://example.com/search?q={query}",
                "result_selectors": ["li.result"]
            }"#,
        )
        .unwrap();

        assert_eq!(spec.timeout(), Duration::from_secs(30));
        assert_eq!(spec.title_selectors[0], "h2 a");
        assert_eq!(spec.summary_selectors, vec!["p".to_string()]);
    }

    #[test]
    fn test_rejects_out_of_range_timeout() {
        let mut spec = default_sources().remove(0);
        spec.timeout_secs = 0;
        assert!(spec.validate().is_err());

        spec.timeout_secs = u64::MAX;
        let err = spec.build_url(&ScrapeQuery::new("x")).unwrap_err();
        assert_eq!(err.kind(), "invalid_source");

        spec.timeout_secs = MAX_TIMEOUT_SECS;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_blank_query() {
        assert!(ScrapeQuery::new("   ").is_blank());
        assert!(!ScrapeQuery::new("back pain").is_blank());
    }
}

use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};

/// A single clinical resource pulled from one source's results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    /// Visible title of the result
    pub title: String,

    /// Absolute link to the resource
    pub url: String,

    /// Short description, possibly empty
    pub summary: String,

    /// Fixed label of the owning source (e.g. "Guideline")
    #[serde(rename = "type")]
    pub category: String,

    /// Identifier of the owning source (e.g. "NICE")
    #[serde(rename = "source")]
    pub source_name: String,
}

impl ExtractedItem {
    /// Create a new item
    pub fn new(
        title: String,
        url: String,
        summary: String,
        category: String,
        source_name: String,
    ) -> Self {
        Self {
            title,
            url,
            summary,
            category,
            source_name,
        }
    }
}

/// Why a source contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// One of `connection`, `navigation`, `timeout`, `invalid_source`, `aborted`
    pub kind: String,
    pub message: String,
}

impl From<&ScrapeError> for SourceFailure {
    fn from(err: &ScrapeError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Diagnostic outcome of one source's pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: String,

    /// Number of items this source contributed
    pub items: usize,

    pub elapsed_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SourceFailure>,
}

impl SourceReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Combined output of one query: items in source order plus one report per source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub items: Vec<ExtractedItem>,
    pub reports: Vec<SourceReport>,
}

impl AggregateResult {
    /// Append one source's outcome, keeping items and reports aligned
    pub fn push_source(&mut self, mut report: SourceReport, items: Vec<ExtractedItem>) {
        report.items = items.len();
        self.items.extend(items);
        self.reports.push(report);
    }

    /// True when sources were attempted and every one of them failed
    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty() && self.reports.iter().all(|r| !r.succeeded())
    }
}

/// Response handed back to the calling API layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub resources: Vec<ExtractedItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceReport>,

    /// Diagnostic only; never used for control flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    /// An empty response carrying only a diagnostic message
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            resources: Vec::new(),
            sources: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl From<AggregateResult> for SearchResponse {
    fn from(result: AggregateResult) -> Self {
        let error = if result.reports.is_empty() {
            Some("no sources configured".to_string())
        } else if result.all_failed() {
            Some(format!("all {} sources failed", result.reports.len()))
        } else {
            None
        };

        Self {
            resources: result.items,
            sources: result.reports,
            error,
        }
    }
}

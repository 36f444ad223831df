use crate::browser::LoadedPage;
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::parsers::{self, ItemLimits};
use crate::results::ExtractedItem;
use crate::sources::SourceSpec;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Settings shared by every source's extraction
#[derive(Debug, Clone, Copy)]
pub struct ExtractionSettings {
    /// How long to wait for a result selector to appear
    pub selector_wait: Duration,
    /// Delay between probe rounds while waiting
    pub poll_interval: Duration,
    pub limits: ItemLimits,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

impl ExtractionSettings {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            selector_wait: config.selector_wait(),
            poll_interval: config.poll_interval(),
            limits: ItemLimits {
                max_items: config.max_items_per_source,
                min_title_chars: config.min_title_chars,
                summary_max_chars: config.summary_max_chars,
            },
        }
    }
}

/// Extract result items from a loaded page.
///
/// Never fails: a results block that never shows up, a broken DOM or any
/// other problem yields an empty list.
pub async fn extract<P>(
    page: &P,
    spec: &SourceSpec,
    settings: &ExtractionSettings,
) -> Vec<ExtractedItem>
where
    P: LoadedPage + ?Sized,
{
    match try_extract(page, spec, settings).await {
        Ok(items) => {
            ::log::debug!(
                "{}: extracted {} items from {}",
                spec.id,
                items.len(),
                page.url()
            );
            items
        }
        Err(e) => {
            ::log::warn!("{}: extraction from {} failed: {}", spec.id, page.url(), e);
            Vec::new()
        }
    }
}

async fn try_extract<P>(
    page: &P,
    spec: &SourceSpec,
    settings: &ExtractionSettings,
) -> Result<Vec<ExtractedItem>, ScrapeError>
where
    P: LoadedPage + ?Sized,
{
    let waited = wait_for_results(
        page,
        &spec.result_selectors,
        settings.selector_wait,
        settings.poll_interval,
    )
    .await;

    let Some(selector) = waited else {
        ::log::info!(
            "{}: no result selector appeared within {:?}",
            spec.id,
            settings.selector_wait
        );
        return Ok(Vec::new());
    };
    ::log::debug!("{}: results present via {:?}", spec.id, selector);

    let html = page.source().await?;
    Ok(parsers::extract_items(&html, page.url(), spec, &settings.limits))
}

/// Wait for the first of `candidates` that matches at least one element.
///
/// Each round probes the candidates in order; rounds repeat every
/// `poll_interval` until one matches or `within` elapses.
pub async fn wait_for_results<P>(
    page: &P,
    candidates: &[String],
    within: Duration,
    poll_interval: Duration,
) -> Option<String>
where
    P: LoadedPage + ?Sized,
{
    if candidates.is_empty() {
        return None;
    }

    let probing = async {
        loop {
            for candidate in candidates {
                match page.matches(candidate).await {
                    Ok(true) => return candidate.clone(),
                    Ok(false) => {}
                    Err(e) => ::log::debug!("Probe for {:?} failed: {}", candidate, e),
                }
            }
            sleep(poll_interval).await;
        }
    };

    timeout(within, probing).await.ok()
}

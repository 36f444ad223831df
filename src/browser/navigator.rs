use crate::browser::session::Session;
use crate::error::ScrapeError;
use async_trait::async_trait;
use fantoccini::{Client, Locator};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Bound on closing the tab of a timed-out navigation
pub const DISCARD_GRACE: Duration = Duration::from_secs(2);

/// A page whose document has finished loading
#[async_trait]
pub trait LoadedPage: Send + Sync {
    /// URL the page ended up on, used to resolve relative links
    fn url(&self) -> &Url;

    /// Whether `selector` currently matches at least one element
    async fn matches(&self, selector: &str) -> Result<bool, ScrapeError>;

    /// Snapshot of the current DOM as HTML
    async fn source(&self) -> Result<String, ScrapeError>;
}

/// Load `url` in a new tab of `session`, giving up after `limit`.
///
/// A timed-out navigation never yields a page; its tab is discarded.
pub async fn load<S: Session>(
    session: &mut S,
    url: &Url,
    limit: Duration,
) -> Result<S::Page, ScrapeError> {
    ::log::debug!("Loading {} (timeout {:?})", url, limit);

    let outcome = timeout(limit, session.navigate(url, limit)).await;
    match outcome {
        Ok(Ok(page)) => {
            ::log::debug!("Loaded {}", page.url());
            Ok(page)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => {
            ::log::warn!("Navigation to {} timed out after {:?}", url, limit);
            if timeout(DISCARD_GRACE, session.discard_page()).await.is_err() {
                ::log::debug!("Gave up discarding tab for {}", url);
            }
            Err(ScrapeError::Timeout(limit))
        }
    }
}

/// A loaded tab in a WebDriver session
pub struct WebDriverPage {
    client: Client,
    url: Url,
}

impl WebDriverPage {
    pub(crate) fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl LoadedPage for WebDriverPage {
    fn url(&self) -> &Url {
        &self.url
    }

    async fn matches(&self, selector: &str) -> Result<bool, ScrapeError> {
        self.client
            .find_all(Locator::Css(selector))
            .await
            .map(|elements| !elements.is_empty())
            .map_err(|e| ScrapeError::Extraction(format!("selector {:?}: {}", selector, e)))
    }

    async fn source(&self) -> Result<String, ScrapeError> {
        self.client
            .source()
            .await
            .map_err(|e| ScrapeError::Extraction(format!("page source: {}", e)))
    }
}

use crate::browser::navigator::{LoadedPage, WebDriverPage};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use async_trait::async_trait;
use fantoccini::wd::{Capabilities, TimeoutConfiguration, WindowHandle};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Bound on closing a session once its source is done
pub const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Opens browser sessions.
///
/// Each call yields an independent session; nothing is pooled or shared
/// between sources.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: Session;

    /// Establish a new session, failing fast with [`ScrapeError::Connection`]
    /// when the endpoint is missing or unreachable.
    async fn connect(&self) -> Result<Self::Session, ScrapeError>;
}

/// One live connection to the remote browser.
///
/// Dropping a session must release the remote resources, so that a pipeline
/// cancelled by a timeout still cleans up.
#[async_trait]
pub trait Session: Send {
    type Page: LoadedPage;

    /// Open a fresh tab and load `url` in it, returning once the document's
    /// content has loaded. `limit` is passed on so the remote side can stop
    /// the load as well.
    async fn navigate(&mut self, url: &Url, limit: Duration) -> Result<Self::Page, ScrapeError>;

    /// Throw away the tab of an abandoned navigation
    async fn discard_page(&mut self);

    /// End the session
    async fn close(self) -> Result<(), ScrapeError>;
}

/// Connects to a WebDriver endpoint (chromedriver, Selenium grid, hosted browsers)
#[derive(Debug, Clone)]
pub struct WebDriverConnector {
    endpoint: Option<String>,
    headless: bool,
    connect_timeout: Duration,
}

impl WebDriverConnector {
    pub fn new(endpoint: Option<String>, headless: bool, connect_timeout: Duration) -> Self {
        Self {
            endpoint,
            headless,
            connect_timeout,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.endpoint().map(str::to_string),
            config.headless,
            config.connect_timeout(),
        )
    }

    /// Session capabilities.
    ///
    /// `eager` page loading returns from navigation at DOMContentLoaded
    /// instead of waiting for every third-party asset.
    fn capabilities(&self) -> Capabilities {
        let mut args = vec![json!("--disable-dev-shm-usage"), json!("--no-sandbox")];
        if self.headless {
            args.push(json!("--headless=new"));
            args.push(json!("--disable-gpu"));
        }

        let mut caps = Capabilities::new();
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }
}

#[async_trait]
impl Connector for WebDriverConnector {
    type Session = WebDriverSession;

    async fn connect(&self) -> Result<WebDriverSession, ScrapeError> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            ScrapeError::Connection("no WebDriver endpoint configured".to_string())
        })?;

        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());

        match timeout(self.connect_timeout, builder.connect(endpoint)).await {
            Ok(Ok(client)) => {
                ::log::debug!("Connected to WebDriver at {}", endpoint);
                Ok(WebDriverSession::new(client))
            }
            Ok(Err(e)) => Err(ScrapeError::Connection(format!(
                "failed to connect to WebDriver at {}: {}",
                endpoint, e
            ))),
            Err(_) => Err(ScrapeError::Connection(format!(
                "timed out after {:?} connecting to WebDriver at {}",
                self.connect_timeout, endpoint
            ))),
        }
    }
}

/// A WebDriver session. The remote session ends when the last clone of the
/// underlying client is dropped, or earlier through [`Session::close`].
pub struct WebDriverSession {
    client: Client,
    tab: Option<WindowHandle>,
}

impl WebDriverSession {
    fn new(client: Client) -> Self {
        Self { client, tab: None }
    }
}

#[async_trait]
impl Session for WebDriverSession {
    type Page = WebDriverPage;

    async fn navigate(&mut self, url: &Url, limit: Duration) -> Result<WebDriverPage, ScrapeError> {
        let timeouts = TimeoutConfiguration::new(Some(limit), Some(limit), Some(Duration::ZERO));
        self.client.update_timeouts(timeouts).await?;

        let window = self.client.new_window(true).await?;
        self.client.switch_to_window(window.handle.clone()).await?;
        self.tab = Some(window.handle);

        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| ScrapeError::Navigation(format!("{}: {}", url, e)))?;

        // Resolve links against where we actually landed
        let landed = match self.client.current_url().await {
            Ok(current) => current,
            Err(e) => {
                ::log::debug!("Could not read current URL after loading {}: {}", url, e);
                url.clone()
            }
        };

        Ok(WebDriverPage::new(self.client.clone(), landed))
    }

    async fn discard_page(&mut self) {
        if self.tab.take().is_some() {
            if let Err(e) = self.client.close_window().await {
                ::log::debug!("Failed to close abandoned tab: {}", e);
            }
        }
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.client
            .close()
            .await
            .map_err(|e| ScrapeError::Connection(format!("failed to close session: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_endpoint_fails_immediately() {
        let connector = WebDriverConnector::new(None, true, Duration::from_secs(10));

        let started = std::time::Instant::now();
        let err = match connector.connect().await {
            Ok(_) => panic!("connect should fail without an endpoint"),
            Err(e) => e,
        };

        assert_eq!(err.kind(), "connection");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_capabilities_use_eager_load_strategy() {
        let connector = WebDriverConnector::new(None, true, Duration::from_secs(1));
        let caps = connector.capabilities();

        assert_eq!(caps["pageLoadStrategy"], "eager");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless=new")));
    }

    #[test]
    fn test_from_config_ignores_blank_endpoint() {
        let config = ScraperConfig {
            webdriver_url: Some(" ".to_string()),
            ..ScraperConfig::default()
        };
        let connector = WebDriverConnector::from_config(&config);
        assert!(connector.endpoint.is_none());
    }
}

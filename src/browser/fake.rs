//! In-memory browser used by the pipeline tests. Pages are served from HTML
//! fixtures keyed by host; selectors are evaluated with `scraper`.

use crate::browser::navigator::LoadedPage;
use crate::browser::session::{Connector, Session};
use crate::error::ScrapeError;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// How a fake page behaves when navigated to
#[derive(Debug, Clone)]
pub(crate) enum PageScript {
    /// Loads immediately and serves this HTML
    Html(String),
    /// Loads immediately, but selectors only start matching after this many probes
    Delayed { html: String, probes: usize },
    /// Loads, but reading the DOM fails
    BrokenDom,
    NavigationFails,
    /// Never finishes loading
    Hang,
}

#[derive(Debug, Default)]
pub(crate) struct FakeStats {
    pub connects: AtomicUsize,
    pub released: AtomicUsize,
    pub closed: AtomicUsize,
    pub discarded: AtomicUsize,
    open: AtomicUsize,
    pub max_open: AtomicUsize,
}

#[derive(Debug, Default)]
struct Routes {
    by_host: HashMap<String, PageScript>,
    fallback: Option<PageScript>,
}

impl Routes {
    fn script_for(&self, url: &Url) -> Option<PageScript> {
        url.host_str()
            .and_then(|host| self.by_host.get(host))
            .or(self.fallback.as_ref())
            .cloned()
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeConnector {
    routes: Arc<Routes>,
    refuse: bool,
    pub stats: Arc<FakeStats>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `script` for every URL on `host`
    pub fn route(mut self, host: &str, script: PageScript) -> Self {
        Arc::get_mut(&mut self.routes)
            .expect("routes are only configured before use")
            .by_host
            .insert(host.to_string(), script);
        self
    }

    /// Refuse every connection, like an unreachable endpoint
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> Arc<FakeStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self) -> Result<FakeSession, ScrapeError> {
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(ScrapeError::Connection("connection refused".to_string()));
        }
        Ok(FakeSession::open(
            Arc::clone(&self.routes),
            Arc::clone(&self.stats),
        ))
    }
}

pub(crate) struct FakeSession {
    routes: Arc<Routes>,
    stats: Arc<FakeStats>,
}

impl FakeSession {
    /// A standalone session serving `script` for every URL
    pub fn new(script: PageScript) -> Self {
        let routes = Routes {
            by_host: HashMap::new(),
            fallback: Some(script),
        };
        Self::open(Arc::new(routes), Arc::new(FakeStats::default()))
    }

    fn open(routes: Arc<Routes>, stats: Arc<FakeStats>) -> Self {
        let open = stats.open.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_open.fetch_max(open, Ordering::SeqCst);
        Self { routes, stats }
    }

    pub fn discarded(&self) -> usize {
        self.stats.discarded.load(Ordering::SeqCst)
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.stats.open.fetch_sub(1, Ordering::SeqCst);
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for FakeSession {
    type Page = FakePage;

    async fn navigate(&mut self, url: &Url, _limit: Duration) -> Result<FakePage, ScrapeError> {
        let script = self
            .routes
            .script_for(url)
            .ok_or_else(|| ScrapeError::Navigation(format!("{}: no route", url)))?;

        match script {
            PageScript::Html(html) => Ok(FakePage::new(url.clone(), Some(html), 0)),
            PageScript::Delayed { html, probes } => {
                Ok(FakePage::new(url.clone(), Some(html), probes))
            }
            PageScript::BrokenDom => Ok(FakePage::new(url.clone(), None, 0)),
            PageScript::NavigationFails => Err(ScrapeError::Navigation(format!(
                "{}: net::ERR_NAME_NOT_RESOLVED",
                url
            ))),
            PageScript::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending never resolves")
            }
        }
    }

    async fn discard_page(&mut self) {
        self.stats.discarded.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct FakePage {
    url: Url,
    html: Option<String>,
    hidden_for: usize,
    probes: AtomicUsize,
}

impl FakePage {
    pub fn new(url: Url, html: Option<String>, hidden_for: usize) -> Self {
        Self {
            url,
            html,
            hidden_for,
            probes: AtomicUsize::new(0),
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

fn html_matches(html: &str, selector: &str) -> Result<bool, ScrapeError> {
    let selector = Selector::parse(selector)
        .map_err(|e| ScrapeError::Extraction(format!("invalid selector: {:?}", e)))?;
    let doc = Html::parse_document(html);
    let found = doc.select(&selector).next().is_some();
    Ok(found)
}

#[async_trait]
impl LoadedPage for FakePage {
    fn url(&self) -> &Url {
        &self.url
    }

    async fn matches(&self, selector: &str) -> Result<bool, ScrapeError> {
        let probe = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
        let html = self
            .html
            .as_deref()
            .ok_or_else(|| ScrapeError::Extraction("document detached".to_string()))?;
        if probe <= self.hidden_for {
            return Ok(false);
        }
        html_matches(html, selector)
    }

    async fn source(&self) -> Result<String, ScrapeError> {
        self.html
            .clone()
            .ok_or_else(|| ScrapeError::Extraction("document detached".to_string()))
    }
}

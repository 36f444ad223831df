use crate::browser::navigator::DISCARD_GRACE;
use crate::browser::session::CLOSE_GRACE;
use crate::browser::{Connector, Session, WebDriverConnector, navigator};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::extractor::{self, ExtractionSettings};
use crate::results::{
    AggregateResult, ExtractedItem, SearchResponse, SourceFailure, SourceReport,
};
use crate::sources::{ScrapeQuery, SourceSpec};
use crate::utils::as_millis;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{Instant, timeout};

/// Outcome of one source's pipeline
type SourceOutcome = (SourceReport, Vec<ExtractedItem>);

/// Runs every configured source for a query and combines what they return.
///
/// Holds only immutable state, so one instance can serve concurrent queries.
pub struct Aggregator<C = WebDriverConnector> {
    connector: Arc<C>,
    sources: Arc<Vec<SourceSpec>>,
    settings: ExtractionSettings,
    connect_timeout: Duration,
    max_concurrency: usize,
}

impl Aggregator<WebDriverConnector> {
    /// Aggregator backed by the configured WebDriver endpoint
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::with_connector(WebDriverConnector::from_config(config), config)
    }
}

impl<C> Aggregator<C>
where
    C: Connector + 'static,
{
    pub fn with_connector(connector: C, config: &ScraperConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            sources: Arc::new(config.sources.clone()),
            settings: ExtractionSettings::from_config(config),
            connect_timeout: config.connect_timeout(),
            max_concurrency: config.max_concurrency,
        }
    }

    /// Replace the source table
    pub fn with_sources(mut self, sources: Vec<SourceSpec>) -> Self {
        self.sources = Arc::new(sources);
        self
    }

    /// Set how many sources may be scraped at once (1 = sequential)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    /// Upper bound on the wall-clock time of one source's pipeline
    pub fn source_budget(&self, spec: &SourceSpec) -> Duration {
        source_budget(spec, &self.settings, self.connect_timeout)
    }

    /// Search every source for `query`. Never fails; problems show up as
    /// missing items, per-source reports and the `error` descriptor.
    pub async fn search(&self, query: &str) -> SearchResponse {
        let query = ScrapeQuery::new(query);
        if query.is_blank() {
            ::log::warn!("Rejecting blank query");
            return SearchResponse::failed("query must not be empty");
        }

        self.scrape(&query).await.into()
    }

    /// Scrape every source and concatenate their items in declared order
    pub async fn scrape(&self, query: &ScrapeQuery) -> AggregateResult {
        let started = Instant::now();
        ::log::info!(
            "Scraping {} sources for {:?}",
            self.sources.len(),
            query.as_str()
        );

        let outcomes = if self.max_concurrency <= 1 {
            self.scrape_sequential(query).await
        } else {
            self.scrape_concurrent(query).await
        };

        let mut result = AggregateResult::default();
        for (report, items) in outcomes {
            result.push_source(report, items);
        }

        ::log::info!(
            "Scrape for {:?} finished with {} items from {} sources in {:.2} seconds",
            query.as_str(),
            result.items.len(),
            result.reports.iter().filter(|r| r.succeeded()).count(),
            started.elapsed().as_secs_f64()
        );
        result
    }

    async fn scrape_sequential(&self, query: &ScrapeQuery) -> Vec<SourceOutcome> {
        let total = self.sources.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, spec) in self.sources.iter().enumerate() {
            ::log::debug!("Scraping source {}/{}: {}", index + 1, total, spec.id);
            outcomes.push(
                run_source(
                    self.connector.as_ref(),
                    spec,
                    query,
                    &self.settings,
                    self.connect_timeout,
                )
                .await,
            );
        }

        outcomes
    }

    /// One task per source, at most `max_concurrency` running at a time.
    /// Results are joined in declared order.
    async fn scrape_concurrent(&self, query: &ScrapeQuery) -> Vec<SourceOutcome> {
        let limit = self.max_concurrency.clamp(1, self.sources.len().max(1));
        let permits = Arc::new(Semaphore::new(limit));

        let handles: Vec<_> = self
            .sources
            .iter()
            .cloned()
            .map(|spec| {
                let connector = Arc::clone(&self.connector);
                let permits = Arc::clone(&permits);
                let query = query.clone();
                let settings = self.settings;
                let connect_timeout = self.connect_timeout;

                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok();
                    run_source(
                        connector.as_ref(),
                        &spec,
                        &query,
                        &settings,
                        connect_timeout,
                    )
                    .await
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (spec, handle) in self.sources.iter().zip(handles) {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    ::log::error!("Task for source {} aborted: {}", spec.id, e);
                    let report = SourceReport {
                        source: spec.id.clone(),
                        items: 0,
                        elapsed_ms: 0,
                        error: Some(SourceFailure {
                            kind: "aborted".to_string(),
                            message: e.to_string(),
                        }),
                    };
                    outcomes.push((report, Vec::new()));
                }
            }
        }

        outcomes
    }
}

fn source_budget(
    spec: &SourceSpec,
    settings: &ExtractionSettings,
    connect_timeout: Duration,
) -> Duration {
    connect_timeout
        .saturating_add(spec.timeout())
        .saturating_add(DISCARD_GRACE)
        .saturating_add(settings.selector_wait)
        .saturating_add(CLOSE_GRACE)
}

/// Run one source under its budget and turn any failure into an empty
/// contribution with a report.
async fn run_source<C: Connector>(
    connector: &C,
    spec: &SourceSpec,
    query: &ScrapeQuery,
    settings: &ExtractionSettings,
    connect_timeout: Duration,
) -> SourceOutcome {
    let started = Instant::now();
    let budget = source_budget(spec, settings, connect_timeout);

    let outcome = match timeout(budget, scrape_source(connector, spec, query, settings)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ScrapeError::Timeout(budget)),
    };

    let (items, error) = match outcome {
        Ok(items) => {
            ::log::info!("Source {} returned {} items", spec.id, items.len());
            (items, None)
        }
        Err(e) => {
            ::log::warn!("Source {} failed: {}", spec.id, e);
            (Vec::new(), Some(SourceFailure::from(&e)))
        }
    };

    let report = SourceReport {
        source: spec.id.clone(),
        items: items.len(),
        elapsed_ms: as_millis(started.elapsed()),
        error,
    };
    (report, items)
}

/// Connect, load, extract, release
async fn scrape_source<C: Connector>(
    connector: &C,
    spec: &SourceSpec,
    query: &ScrapeQuery,
    settings: &ExtractionSettings,
) -> Result<Vec<ExtractedItem>, ScrapeError> {
    let url = spec.build_url(query)?;
    let mut session = connector.connect().await?;

    let outcome = match navigator::load(&mut session, &url, spec.timeout()).await {
        Ok(page) => Ok(extractor::extract(&page, spec, settings).await),
        Err(e) => Err(e),
    };

    release(session, &spec.id).await;
    outcome
}

async fn release<S: Session>(session: S, source: &str) {
    match timeout(CLOSE_GRACE, session.close()).await {
        Ok(Ok(())) => ::log::debug!("Closed session for {}", source),
        Ok(Err(e)) => ::log::warn!("Failed to close session for {}: {}", source, e),
        Err(_) => ::log::warn!("Timed out closing session for {}", source),
    }
}

use clap::Parser;
use clinical_scrape::{Aggregator, ScraperConfig};
use std::error::Error;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = load_config(&args)?;
    match config.endpoint() {
        Some(endpoint) => ::log::info!("Using WebDriver endpoint {}", endpoint),
        None => ::log::warn!(
            "No WebDriver endpoint configured; set WEBDRIVER_URL or --webdriver-url. Sources will return nothing."
        ),
    }

    let aggregator = Aggregator::from_config(&config);
    let response = aggregator.search(&args.query).await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);

    Ok(())
}

/// Config file (or defaults), then WEBDRIVER_URL, then command-line flags
fn load_config(args: &Args) -> Result<ScraperConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::default(),
    }
    .with_env_overrides();

    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = Some(url.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(max_items) = args.max_items {
        config.max_items_per_source = max_items;
    }
    if !args.sources.is_empty() {
        config
            .sources
            .retain(|s| args.sources.iter().any(|id| id.eq_ignore_ascii_case(&s.id)));
        if config.sources.is_empty() {
            return Err(format!("no configured source matches {:?}", args.sources).into());
        }
    }

    config.validate()?;
    Ok(config)
}

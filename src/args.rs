use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "clinical-scrape")]
#[command(about = "Search NICE, NHS and CSP for clinical resources through a remote browser")]
#[command(version)]
pub struct Args {
    /// Free-text search query
    pub query: String,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver endpoint (overrides the config file and WEBDRIVER_URL)
    #[arg(short, long)]
    pub webdriver_url: Option<String>,

    /// Number of sources scraped at once (1 = one after another)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Maximum items taken from each source
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Only scrape these source ids (repeatable), e.g. --source NICE
    #[arg(short, long = "source")]
    pub sources: Vec<String>,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,
}

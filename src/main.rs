//! CLI entry point: posts the latest weekly Halifax Transit ridership chart.
//!
//! Meant to run from cron. A run that finds no new week exits successfully
//! without posting.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weekly_ridership::app::{RunOutcome, run};
use weekly_ridership::config::Config;
use weekly_ridership::fetch::BasicClient;
use weekly_ridership::infra::twitter::TwitterClient;
use weekly_ridership::services::publisher::Publisher;

#[derive(Parser)]
#[command(name = "weekly_ridership")]
#[command(about = "Post a chart of weekly transit ridership", long_about = None)]
struct Cli {
    /// Write the chart locally instead of posting (same as TEST_MODE=true)
    #[arg(long, default_value_t = false)]
    test_mode: bool,

    /// Ridership CSV to fetch
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// File remembering the last posted week
    #[arg(long, value_name = "PATH")]
    marker_file: Option<PathBuf>,

    /// Where test mode writes the chart
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/weekly_ridership.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weekly_ridership.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    if let Err(e) = post_latest_week(cli).await {
        error!(error = %e, "Run failed");
        return Err(e.into());
    }
    Ok(())
}

async fn post_latest_week(cli: Cli) -> weekly_ridership::error::Result<()> {
    let mut config = Config::from_env(cli.test_mode)?;
    if let Some(url) = cli.source_url {
        config.source_url = url;
    }
    if let Some(path) = cli.marker_file {
        config.marker_path = path;
    }
    if let Some(path) = cli.output {
        config.graph_output = path;
    }

    let http = BasicClient::new();
    let twitter = config
        .credentials
        .as_ref()
        .filter(|_| !config.test_mode)
        .map(TwitterClient::from_credentials);
    let publisher = twitter.as_ref().map(|t| t as &dyn Publisher);

    match run(&config, &http, publisher).await? {
        RunOutcome::NoData => info!("Source had no data"),
        RunOutcome::AlreadyPosted { week_end } => {
            info!(%week_end, "Nothing new to post");
        }
        RunOutcome::TestMode { path } => {
            info!(path = %path.display(), "Chart written");
        }
        RunOutcome::Published { permalink } => println!("{permalink}"),
    }
    Ok(())
}

//! One posting run: fetch, dedupe, render, caption, publish, remember.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::caption::{alt_text, status_text};
use crate::chart;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::HttpClient;
use crate::marker::{DoneMarker, write_private};
use crate::parser::fetch_weeks;
use crate::services::publisher::Publisher;
use crate::week::{RECENT_WEEKS, recent_window};

/// How a run ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The source had no rows.
    NoData,
    /// The most recent week was already posted by an earlier run.
    AlreadyPosted { week_end: NaiveDate },
    /// The chart was written locally instead of being posted.
    TestMode { path: PathBuf },
    Published { permalink: String },
}

/// Runs the pipeline once.
///
/// The done marker is only written after `publisher` reports success, so a
/// failed post is retried by the next run. In test mode the chart is written
/// to [`Config::graph_output`] and neither the publisher nor the marker is
/// touched.
#[instrument(skip_all, fields(source = %config.source_url, test_mode = config.test_mode))]
pub async fn run<C, P>(config: &Config, http: &C, publisher: Option<&P>) -> Result<RunOutcome>
where
    C: HttpClient,
    P: Publisher + ?Sized,
{
    let weeks = fetch_weeks(http, &config.source_url).await?;
    let window = recent_window(&weeks, RECENT_WEEKS);
    let Some(latest) = window.last() else {
        info!("No ridership data, nothing to post");
        return Ok(RunOutcome::NoData);
    };

    let marker = DoneMarker::new(&config.marker_path);
    if marker.is_already_done(latest)? {
        info!(week_end = %latest.end, "Week already posted");
        return Ok(RunOutcome::AlreadyPosted {
            week_end: latest.end,
        });
    }

    let image = chart::render(window)?;
    let status = status_text(latest, &config.locale);
    let alt = alt_text(window, &config.locale);
    info!(
        status = %status,
        status_len = status.chars().count(),
        alt = %alt,
        "Prepared post"
    );

    if config.test_mode {
        let path = config.graph_output.clone();
        write_private(&path, &image)?;
        info!(path = %path.display(), "Test mode, wrote chart instead of posting");
        return Ok(RunOutcome::TestMode { path });
    }

    let Some(publisher) = publisher else {
        return Err(Error::post("no publisher configured outside test mode"));
    };
    let permalink = publisher.publish(&image, &status, &alt).await?;
    marker.mark_done(latest)?;

    Ok(RunOutcome::Published { permalink })
}

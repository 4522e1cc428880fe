//! CSV parser for the weekly ridership export.

use std::collections::BTreeMap;

use csv::ReaderBuilder;
use tracing::{debug, instrument};

use crate::error::{ParseError, Result};
use crate::fetch::{HttpClient, fetch_bytes};
use crate::week::{WeekRange, WeeklyTotal};

pub const WEEK_RANGE_COLUMN: &str = "Week_Range";
pub const RIDERSHIP_COLUMN: &str = "Ridership_Total";

/// Decodes the ridership CSV into weekly totals, ascending by start date.
///
/// Rows that share a week range are summed into one total. The source splits
/// each week across several rows.
///
/// # Errors
///
/// Returns an error if a required column is missing, a ridership value is not
/// a non-negative integer, or a week-range label is malformed. Nothing is
/// returned for the rows that did parse.
pub fn parse_weeks(bytes: &[u8]) -> std::result::Result<Vec<WeeklyTotal>, ParseError> {
    let mut reader = ReaderBuilder::new().from_reader(bytes);

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(ParseError::MissingColumn(name))
    };
    let week_idx = column(WEEK_RANGE_COLUMN)?;
    let count_idx = column(RIDERSHIP_COLUMN)?;

    let mut totals: BTreeMap<WeekRange, u64> = BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        let label = record.get(week_idx).unwrap_or_default();
        let range = WeekRange::parse(label)?;

        let raw = record.get(count_idx).unwrap_or_default();
        let count: u64 = raw
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidRidership {
                value: raw.to_string(),
                line,
            })?;

        let total = totals.entry(range).or_default();
        *total = total
            .checked_add(count)
            .ok_or_else(|| ParseError::RidershipOverflow {
                week: label.to_string(),
                line,
            })?;
    }

    Ok(totals
        .into_iter()
        .map(|(range, count)| range.with_count(count))
        .collect())
}

/// Fetches the ridership CSV at `url` and aggregates it into weekly totals.
#[instrument(skip(client))]
pub async fn fetch_weeks<C: HttpClient>(client: &C, url: &str) -> Result<Vec<WeeklyTotal>> {
    let bytes = fetch_bytes(client, url).await?;
    let weeks = parse_weeks(&bytes)?;
    debug!(weeks = weeks.len(), "Parsed weekly ridership");
    Ok(weeks)
}

//! Weekly ridership totals and the week-range labels they are keyed by.

use chrono::NaiveDate;

use crate::error::ParseError;

/// Number of most recent weeks shown in the chart and described in captions.
pub const RECENT_WEEKS: usize = 8;

/// Date format of the start/end tokens in a week-range label.
const LABEL_DATE_FORMAT: &str = "%Y.%m.%d";

/// Date format stored in the done marker.
const MARKER_DATE_FORMAT: &str = "%Y-%m-%d";

/// One calendar week's aggregated ridership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTotal {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: u64,
}

impl WeeklyTotal {
    pub fn new(start: NaiveDate, end: NaiveDate, count: u64) -> Self {
        Self { start, end, count }
    }

    /// The end date as persisted in the done marker, e.g. `2024-01-07`.
    pub fn marker_value(&self) -> String {
        self.end.format(MARKER_DATE_FORMAT).to_string()
    }
}

/// Parsed form of a `"<start> .. <end>"` label such as `2024.01.01 .. 2024.01.07`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// Parses a week-range label.
    ///
    /// The label must split into exactly three whitespace-separated tokens;
    /// the first and last are `YYYY.MM.DD` dates and the start may not come
    /// after the end.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidWeekRange`] for the wrong token count or a
    /// reversed range, and [`ParseError::InvalidDate`] for an unparseable date.
    pub fn parse(label: &str) -> Result<Self, ParseError> {
        let tokens: Vec<&str> = label.split_whitespace().collect();
        let [start, _, end] = tokens.as_slice() else {
            return Err(ParseError::InvalidWeekRange(label.to_string()));
        };

        let start = parse_label_date(start)?;
        let end = parse_label_date(end)?;
        if start > end {
            return Err(ParseError::InvalidWeekRange(label.to_string()));
        }

        Ok(Self { start, end })
    }

    pub fn with_count(self, count: u64) -> WeeklyTotal {
        WeeklyTotal::new(self.start, self.end, count)
    }
}

fn parse_label_date(token: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(token, LABEL_DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(token.to_string()))
}

/// Returns the last `n` weeks, or all of them when fewer exist.
pub fn recent_window(weeks: &[WeeklyTotal], n: usize) -> &[WeeklyTotal] {
    &weeks[weeks.len().saturating_sub(n)..]
}

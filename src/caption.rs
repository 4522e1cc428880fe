//! Post text and image alt text describing the most recent week.

use num_format::{Locale, ToFormattedString};

use crate::week::WeeklyTotal;

/// Status text for the post, e.g. `Week ending Sun Jan 07 had 4,500 passengers`.
pub fn status_text(week: &WeeklyTotal, locale: &Locale) -> String {
    format!(
        "Week ending {} had {} passengers",
        week.end.format("%a %b %d"),
        week.count.to_formatted_string(locale)
    )
}

/// Accessibility description of the chart for `weeks`.
///
/// With at least two weeks, the last week is compared against the one
/// before it. The comparison is skipped when the previous count is zero.
pub fn alt_text(weeks: &[WeeklyTotal], locale: &Locale) -> String {
    let mut out = format!(
        "Bar chart of passengers by week for last {} weeks.",
        weeks.len()
    );

    let [.., prev, cur] = weeks else {
        return out;
    };
    let Some(change) = Change::between(prev.count, cur.count) else {
        return out;
    };

    let count = cur.count.to_formatted_string(locale);
    if change.percent > 0 {
        out.push_str(&format!(
            " The most recent count of {count} is {}% {} than the previous week.",
            change.percent,
            change.direction()
        ));
    } else {
        out.push_str(&format!(
            " The most recent count of {count} is about the same as the previous week."
        ));
    }
    out
}

/// Week-over-week change, truncated to a whole percentage of the previous week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Change {
    percent: u64,
    increased: bool,
}

impl Change {
    fn between(prev: u64, cur: u64) -> Option<Self> {
        if prev == 0 {
            return None;
        }
        let increased = cur > prev;
        let diff = cur.abs_diff(prev);
        let percent = (diff as f64 / prev as f64 * 100.0) as u64;
        Some(Self { percent, increased })
    }

    fn direction(&self) -> &'static str {
        if self.increased { "more" } else { "fewer" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(counts: &[u64]) -> Vec<WeeklyTotal> {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let start = first + chrono::Duration::weeks(i as i64);
                WeeklyTotal::new(start, start + chrono::Duration::days(6), count)
            })
            .collect()
    }

    #[test]
    fn test_alt_text_fewer() {
        assert_eq!(
            alt_text(&series(&[5000, 4500]), &Locale::en),
            "Bar chart of passengers by week for last 2 weeks. \
             The most recent count of 4,500 is 10% fewer than the previous week."
        );
    }

    #[test]
    fn test_alt_text_more() {
        assert_eq!(
            alt_text(&series(&[5000, 5500]), &Locale::en),
            "Bar chart of passengers by week for last 2 weeks. \
             The most recent count of 5,500 is 10% more than the previous week."
        );
    }

    #[test]
    fn test_alt_text_about_the_same() {
        assert_eq!(
            alt_text(&series(&[5000, 5001]), &Locale::en),
            "Bar chart of passengers by week for last 2 weeks. \
             The most recent count of 5,001 is about the same as the previous week."
        );

        let text = alt_text(&series(&[100, 7000, 7000]), &Locale::en);
        assert!(text.ends_with("is about the same as the previous week."));
    }

    #[test]
    fn test_alt_text_compares_only_the_last_two_weeks() {
        let text = alt_text(&series(&[1, 2, 3, 4000, 3000]), &Locale::en);
        assert!(text.starts_with("Bar chart of passengers by week for last 5 weeks."));
        assert!(text.contains("3,000 is 25% fewer"));
    }

    #[test]
    fn test_alt_text_percentage_truncates() {
        // 2/3 of a percent more rounds down to "about the same".
        let text = alt_text(&series(&[300, 302]), &Locale::en);
        assert!(text.contains("about the same"));

        // 1999/1000 = 199.9% more.
        let text = alt_text(&series(&[1000, 2999]), &Locale::en);
        assert!(text.contains("2,999 is 199% more"));
    }

    #[test]
    fn test_alt_text_single_week_has_no_comparison() {
        assert_eq!(
            alt_text(&series(&[4200]), &Locale::en),
            "Bar chart of passengers by week for last 1 weeks."
        );
    }

    #[test]
    fn test_alt_text_states_window_length() {
        for n in 1..=8 {
            let counts: Vec<u64> = (0..n).map(|i| 1000 + i).collect();
            let text = alt_text(&series(&counts), &Locale::en);
            assert!(text.starts_with(&format!(
                "Bar chart of passengers by week for last {n} weeks."
            )));
        }
    }

    #[test]
    fn test_alt_text_skips_comparison_after_zero_week() {
        assert_eq!(
            alt_text(&series(&[0, 1200]), &Locale::en),
            "Bar chart of passengers by week for last 2 weeks."
        );
    }

    #[test]
    fn test_alt_text_uses_locale_separators() {
        let text = alt_text(&series(&[5000, 4500]), &Locale::de);
        assert!(text.contains("4.500"));
    }

    #[test]
    fn test_status_text() {
        let week = WeeklyTotal::new(
            NaiveDate::from_ymd_opt(2023, 12, 27).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            123456,
        );
        assert_eq!(
            status_text(&week, &Locale::en),
            "Week ending Tue Jan 02 had 123,456 passengers"
        );
    }

    #[test]
    fn test_change_between() {
        assert_eq!(
            Change::between(5000, 4500),
            Some(Change {
                percent: 10,
                increased: false
            })
        );
        assert_eq!(
            Change::between(5000, 5500),
            Some(Change {
                percent: 10,
                increased: true
            })
        );
        assert_eq!(
            Change::between(10, 10),
            Some(Change {
                percent: 0,
                increased: false
            })
        );
        assert_eq!(Change::between(0, 10), None);
    }
}

//! Event model for the timeline.
//!
//! The layout follows the TimelineJS convention (`start_date` + `text`), so
//! existing timeline data files can be loaded without conversion. Events are
//! immutable once loaded; ordering is derived at load time by [`sort_events`].

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar date of an event as written in the source data.
///
/// Fields are kept raw (signed, unchecked) so that malformed input still
/// loads and can be reported instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDate {
    pub year: i32,
    pub month: i32,
    #[serde(default = "first_day")]
    pub day: i32,
}

fn first_day() -> i32 {
    1
}

impl EventDate {
    pub const fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    /// Sort key covering year and month only.
    ///
    /// Months outside 1-12 roll into the neighbouring years, so the key stays
    /// total and deterministic for malformed dates.
    pub fn month_key(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// Strict conversion; `None` when the date does not exist.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        let month = u32::try_from(self.month).ok()?;
        let day = u32::try_from(self.day).ok()?;
        NaiveDate::from_ymd_opt(self.year, month, day)
    }

    /// Lenient conversion: month and day overflow roll forward the way
    /// calendar arithmetic would (month 13 is January of the next year,
    /// day 0 is the last day of the previous month).
    pub fn resolve(&self) -> Option<NaiveDate> {
        let months = self.month_key();
        let year = i32::try_from(months.div_euclid(12)).ok()?;
        let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        first.checked_add_signed(Duration::days(i64::from(self.day) - 1))
    }

    pub fn is_valid(&self) -> bool {
        self.to_naive().is_some()
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Headline and body of an event.
///
/// `body` may contain inline markup; it must go through
/// [`crate::markup::sanitize`] before it is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventText {
    #[serde(default)]
    pub headline: String,
    #[serde(default, alias = "text")]
    pub body: String,
}

/// A single dated entry on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub start_date: EventDate,
    pub text: EventText,
}

impl TimelineEvent {
    pub fn new(date: EventDate, headline: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            start_date: date,
            text: EventText {
                headline: headline.into(),
                body: body.into(),
            },
        }
    }

    pub fn display_headline(&self) -> &str {
        let headline = self.text.headline.trim();
        if headline.is_empty() {
            "Untitled event"
        } else {
            headline
        }
    }
}

/// Top-level document of a timeline data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimelineData {
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

/// Sort events ascending by `(year, month)`.
///
/// The day is not part of the key; events sharing a month keep their input
/// order (the sort is stable).
pub fn sort_events(mut events: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    events.sort_by_key(|event| event.start_date.month_key());
    events
}

/// Describe every event whose date does not exist on the calendar.
pub fn date_warnings(events: &[TimelineEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|event| !event.start_date.is_valid())
        .map(|event| {
            format!(
                "Malformed date {} on \"{}\"",
                event.start_date,
                event.display_headline()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(year: i32, month: i32, day: i32, headline: &str) -> TimelineEvent {
        TimelineEvent::new(EventDate::new(year, month, day), headline, "")
    }

    fn headlines(events: &[TimelineEvent]) -> Vec<&str> {
        events.iter().map(|e| e.text.headline.as_str()).collect()
    }

    #[test]
    fn test_sort_orders_by_year_then_month() {
        let sorted = sort_events(vec![
            event(2024, 3, 1, "c"),
            event(2022, 11, 5, "a"),
            event(2023, 6, 1, "b"),
            event(2024, 12, 1, "d"),
        ]);
        assert_eq!(headlines(&sorted), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sort_ignores_day_and_is_stable() {
        let sorted = sort_events(vec![
            event(2023, 5, 30, "late in may"),
            event(2023, 1, 1, "january"),
            event(2023, 5, 2, "early in may"),
            event(2023, 5, 15, "mid may"),
        ]);
        assert_eq!(
            headlines(&sorted),
            vec!["january", "late in may", "early in may", "mid may"]
        );
    }

    #[test]
    fn test_sort_is_a_permutation() {
        let input = vec![
            event(2024, 2, 1, "x"),
            event(2022, 2, 1, "y"),
            event(2024, 2, 1, "x"),
            event(2023, 7, 9, "z"),
        ];
        let mut expected = input.clone();
        let mut sorted = sort_events(input);
        assert!(sorted
            .windows(2)
            .all(|w| w[0].start_date.month_key() <= w[1].start_date.month_key()));

        let key = |e: &TimelineEvent| (e.start_date.year, e.start_date.month, e.text.headline.clone());
        expected.sort_by_key(key);
        sorted.sort_by_key(key);
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_month_key_rolls_over_malformed_months() {
        assert_eq!(
            EventDate::new(2022, 13, 1).month_key(),
            EventDate::new(2023, 1, 1).month_key()
        );
        assert_eq!(
            EventDate::new(2023, 0, 1).month_key(),
            EventDate::new(2022, 12, 1).month_key()
        );
    }

    #[test]
    fn test_resolve_matches_calendar_overflow() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(EventDate::new(2023, 6, 1).resolve(), Some(d(2023, 6, 1)));
        assert_eq!(EventDate::new(2022, 13, 1).resolve(), Some(d(2023, 1, 1)));
        assert_eq!(EventDate::new(2023, 2, 30).resolve(), Some(d(2023, 3, 2)));
        assert_eq!(EventDate::new(2023, 3, 0).resolve(), Some(d(2023, 2, 28)));
    }

    #[test]
    fn test_validity_and_warnings() {
        let events = vec![event(2023, 2, 29, "leap?"), event(2024, 2, 29, "leap")];
        assert!(!events[0].start_date.is_valid());
        assert!(events[1].start_date.is_valid());

        let warnings = date_warnings(&events);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("2023-02-29"));
    }

    #[test]
    fn test_display_pads_month_and_day() {
        assert_eq!(EventDate::new(2023, 6, 1).to_string(), "2023-06-01");
    }

    #[test]
    fn test_deserialize_timelinejs_layout() {
        let json = r#"{
            "events": [
                {"start_date": {"year": 2023, "month": 6},
                 "text": {"headline": "Launch", "text": "<p>Body</p>"}}
            ]
        }"#;
        let data: TimelineData = serde_json::from_str(json).unwrap();
        assert_eq!(data.events.len(), 1);
        assert_eq!(data.events[0].start_date, EventDate::new(2023, 6, 1));
        assert_eq!(data.events[0].text.body, "<p>Body</p>");
    }

    #[test]
    fn test_blank_headline_has_fallback() {
        assert_eq!(event(2023, 1, 1, "  ").display_headline(), "Untitled event");
    }
}

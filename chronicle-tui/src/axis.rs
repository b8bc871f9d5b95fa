//! Time axis placement.
//!
//! Both the progress marker and the period labels live on the same vertical
//! track, expressed as a percentage of the spine height. The usable track is
//! 84 points wide with 8-point margins, so the first and last positions are
//! 8% and 92%.

use chrono::NaiveDate;

use crate::error::ConfigError;
use crate::models::TimelineEvent;

/// Percentage of the first usable track position.
pub const TRACK_START: f64 = 8.0;
/// Width of the usable track in percentage points.
pub const TRACK_SPAN: f64 = 84.0;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar constant"),
    }
}

/// Default start of the time axis (beginning of November 2022).
pub const DEFAULT_START: NaiveDate = ymd(2022, 11, 1);
/// Default end of the time axis (end of March 2025).
pub const DEFAULT_END: NaiveDate = ymd(2025, 3, 31);

/// Fixed calendar domain of the time axis.
///
/// Used for placement only; events outside the bounds are neither filtered
/// nor rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl Default for TimelineBounds {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
        }
    }
}

impl TimelineBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if end <= start {
            return Err(ConfigError::InvalidBounds { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    fn span_days(&self) -> f64 {
        (self.end - self.start).num_days() as f64
    }
}

/// Linear position of `date` on the track.
///
/// Not clamped: dates outside the bounds land outside `[8, 92]`.
pub fn marker_position(date: NaiveDate, bounds: &TimelineBounds) -> f64 {
    let elapsed = (date - bounds.start).num_days() as f64;
    elapsed / bounds.span_days() * TRACK_SPAN + TRACK_START
}

/// Marker position for an event, resolving malformed dates leniently.
pub fn event_marker_position(event: &TimelineEvent, bounds: &TimelineBounds) -> Option<f64> {
    event
        .start_date
        .resolve()
        .map(|date| marker_position(date, bounds))
}

/// Years used for the fixed leading and trailing axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConfig {
    pub lead_year: i32,
    pub final_year: i32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            lead_year: 2022,
            final_year: 2025,
        }
    }
}

impl AxisConfig {
    pub fn new(lead_year: i32, final_year: i32) -> Result<Self, ConfigError> {
        if final_year < lead_year {
            return Err(ConfigError::InvalidLabelYears {
                lead_year,
                final_year,
            });
        }
        Ok(Self {
            lead_year,
            final_year,
        })
    }
}

/// A qualitative period label and its track position.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub label: String,
    pub position: f64,
}

/// Period labels for the spine.
///
/// Labels are spaced by index, not by date: `Late <lead>`, then for every
/// event year after the first `Mid <year>` and `Late <year>`, then
/// `Early <final>`.
pub fn axis_labels(events: &[TimelineEvent], config: &AxisConfig) -> Vec<AxisLabel> {
    let mut years: Vec<i32> = Vec::new();
    for event in events {
        if !years.contains(&event.start_date.year) {
            years.push(event.start_date.year);
        }
    }

    let mut names = vec![format!("Late {}", config.lead_year)];
    for &year in years.iter().skip(1) {
        names.push(format!("Mid {year}"));
        names.push(format!("Late {year}"));
    }
    names.push(format!("Early {}", config.final_year));

    let last = (names.len() - 1) as f64;
    names
        .into_iter()
        .enumerate()
        .map(|(index, label)| AxisLabel {
            label,
            position: index as f64 * TRACK_SPAN / last + TRACK_START,
        })
        .collect()
}

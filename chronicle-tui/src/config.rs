//! Command line configuration.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::axis::{AxisConfig, TimelineBounds, DEFAULT_END, DEFAULT_START};
use crate::error::ConfigError;
use crate::loader::EventSource;

#[derive(Parser, Debug, Clone)]
#[command(name = "chronicle")]
#[command(about = "Scroll-synchronised timeline viewer for the terminal")]
#[command(version)]
pub struct Args {
    /// Timeline JSON file to load (defaults to the built-in events)
    #[arg(short, long, env = "CHRONICLE_EVENTS")]
    pub events: Option<PathBuf>,

    /// First date of the time axis (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, default_value = "2022-11-01")]
    pub start: NaiveDate,

    /// Last date of the time axis (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, default_value = "2025-03-31")]
    pub end: NaiveDate,

    /// Year of the leading axis label
    #[arg(long, default_value_t = 2022)]
    pub lead_year: i32,

    /// Year of the trailing axis label
    #[arg(long, default_value_t = 2025)]
    pub final_year: i32,

    /// Start with the timeline overview hidden
    #[arg(long)]
    pub hide_minimap: bool,

    /// Write diagnostics to this file (filtered by RUST_LOG)
    #[arg(long, env = "CHRONICLE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Validated settings the application starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: EventSource,
    pub bounds: TimelineBounds,
    pub axis: AxisConfig,
    pub show_minimap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: EventSource::Builtin,
            bounds: TimelineBounds::default(),
            axis: AxisConfig::default(),
            show_minimap: true,
        }
    }
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let source = args
            .events
            .clone()
            .map_or(EventSource::Builtin, EventSource::File);
        Ok(Self {
            source,
            bounds: TimelineBounds::new(args.start, args.end)?,
            axis: AxisConfig::new(args.lead_year, args.final_year)?,
            show_minimap: !args.hide_minimap,
        })
    }

    /// True when the bounds differ from the defaults.
    pub fn custom_bounds(&self) -> bool {
        self.bounds.start() != DEFAULT_START || self.bounds.end() != DEFAULT_END
    }
}

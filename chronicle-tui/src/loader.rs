//! Event loading.
//!
//! Events come either from the collection compiled into the binary or from a
//! JSON file in the TimelineJS layout. Loading runs on a background Tokio
//! task that talks to the UI loop over channels, so a slow disk never stalls
//! rendering.

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::error::LoadError;
use crate::models::{date_warnings, sort_events, TimelineData, TimelineEvent};

/// Built-in timeline data
const BUILTIN_EVENTS: &str = include_str!("../data/timeline.json");

/// Where the event collection comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventSource {
    #[default]
    Builtin,
    File(PathBuf),
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Builtin => write!(f, "built-in data"),
            EventSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A sorted event collection plus any data-quality warnings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedEvents {
    pub events: Vec<TimelineEvent>,
    pub warnings: Vec<String>,
}

/// Parse a timeline document and sort its events chronologically.
pub fn parse_events(json: &str, origin: &str) -> Result<LoadedEvents, LoadError> {
    let data: TimelineData = serde_json::from_str(json).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    let events = sort_events(data.events);
    let warnings = date_warnings(&events);
    for warning in &warnings {
        tracing::warn!(origin, "{warning}");
    }
    tracing::info!(origin, count = events.len(), "events loaded");

    Ok(LoadedEvents { events, warnings })
}

/// Load the collection from `source`.
pub async fn load_events(source: &EventSource) -> Result<LoadedEvents, LoadError> {
    match source {
        EventSource::Builtin => parse_events(BUILTIN_EVENTS, "built-in data"),
        EventSource::File(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
            parse_events(&json, &path.display().to_string())
        }
    }
}

/// Messages sent from the loader worker to the UI loop
#[derive(Debug, Clone)]
pub enum LoaderMessage {
    /// A collection has been loaded
    EventsLoaded(LoadedEvents),
    /// Loading failed; the current collection stays
    Error(String),
}

/// Commands sent from the UI loop to the loader worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderCommand {
    /// (Re)load the configured source
    Load,
    /// Stop the worker
    Shutdown,
}

/// Run the loader worker until shutdown or until the UI side goes away.
pub async fn run_loader_worker(
    source: EventSource,
    tx: mpsc::Sender<LoaderMessage>,
    rx: &mut mpsc::Receiver<LoaderCommand>,
) {
    loop {
        tokio::select! {
            cmd = rx.recv() => {
                match cmd {
                    Some(LoaderCommand::Load) => {
                        let message = match load_events(&source).await {
                            Ok(loaded) => LoaderMessage::EventsLoaded(loaded),
                            Err(e) => {
                                tracing::error!(error = %e, "load failed");
                                LoaderMessage::Error(e.to_string())
                            }
                        };
                        if tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Some(LoaderCommand::Shutdown) | None => break,
                }
            }
            _ = tx.closed() => break,
        }
    }
    tracing::debug!("loader worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventDate;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "events": [
            { "start_date": {"year": 2024, "month": 2, "day": 9},
              "text": {"headline": "Later", "text": "<p>b</p>"} },
            { "start_date": {"year": 2023, "month": 6},
              "text": {"headline": "Earlier", "body": "a"} }
        ]
    }"#;

    #[test]
    fn test_parse_sorts_and_accepts_both_body_keys() {
        let loaded = parse_events(SAMPLE, "sample").unwrap();
        let headlines: Vec<&str> = loaded.events.iter().map(|e| e.text.headline.as_str()).collect();
        assert_eq!(headlines, vec!["Earlier", "Later"]);
        assert_eq!(loaded.events[0].start_date, EventDate::new(2023, 6, 1));
        assert_eq!(loaded.events[0].text.body, "a");
        assert_eq!(loaded.events[1].text.body, "<p>b</p>");
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_parse_reports_malformed_dates() {
        let json = r#"{"events": [
            {"start_date": {"year": 2023, "month": 13, "day": 1}, "text": {"headline": "Odd"}}
        ]}"#;
        let loaded = parse_events(json, "odd").unwrap();
        assert_eq!(loaded.events.len(), 1);
        assert_eq!(loaded.warnings, vec!["Malformed date 2023-13-01 on \"Odd\"".to_string()]);
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = parse_events("{ not json", "broken.json").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_builtin_data_is_sorted_and_clean() {
        let loaded = parse_events(BUILTIN_EVENTS, "built-in data").unwrap();
        assert!(!loaded.events.is_empty());
        assert!(loaded.warnings.is_empty());
        let keys: Vec<i64> = loaded.events.iter().map(|e| e.start_date.month_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = EventSource::File(file.path().to_path_buf());
        let loaded = load_events(&source).await.unwrap();
        assert_eq!(loaded.events.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = EventSource::File(dir.path().join("missing.json"));
        let err = load_events(&source).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn test_worker_loads_then_shuts_down() {
        let (msg_tx, mut msg_rx) = mpsc::channel(4);
        let (cmd_tx, mut cmd_rx) = mpsc::channel(4);
        let worker = tokio::spawn(async move {
            run_loader_worker(EventSource::Builtin, msg_tx, &mut cmd_rx).await
        });

        cmd_tx.send(LoaderCommand::Load).await.unwrap();
        match msg_rx.recv().await {
            Some(LoaderMessage::EventsLoaded(loaded)) => assert!(!loaded.events.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }

        cmd_tx.send(LoaderCommand::Shutdown).await.unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_reports_errors() {
        let (msg_tx, mut msg_rx) = mpsc::channel(4);
        let (cmd_tx, mut cmd_rx) = mpsc::channel(4);
        let source = EventSource::File(PathBuf::from("/nonexistent/events.json"));
        let worker = tokio::spawn(async move { run_loader_worker(source, msg_tx, &mut cmd_rx).await });

        cmd_tx.send(LoaderCommand::Load).await.unwrap();
        assert!(matches!(msg_rx.recv().await, Some(LoaderMessage::Error(_))));

        drop(cmd_tx);
        worker.await.unwrap();
    }
}

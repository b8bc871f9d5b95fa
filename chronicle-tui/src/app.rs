//! Application state and event handling.
//!
//! Elm-style: a single [`App`] owns all state, input handlers mutate it, and
//! the UI renders from it. The active event is never set directly; every
//! navigation goes through the viewport, whose scroll notifications drive
//! the tracker.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::axis::{axis_labels, event_marker_position, AxisConfig, AxisLabel, TimelineBounds};
use crate::config::Settings;
use crate::layout::layout_cards;
use crate::loader::{EventSource, LoaderCommand, LoaderMessage};
use crate::models::TimelineEvent;
use crate::timeline::minimap_entry_at;
use crate::tracker::ScrollTracker;
use crate::ui::{minimap_inner, screen_layout};
use crate::viewport::{ScrollHost, Viewport};

/// Rows scrolled per wheel notch
const WHEEL_STEP: f64 = 3.0;

/// Error popup state
#[derive(Debug, Clone)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
    /// Auto-dismiss duration (None for manual dismiss)
    pub auto_dismiss: Option<Duration>,
}

impl ErrorPopup {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            shown_at: Instant::now(),
            auto_dismiss: Some(Duration::from_secs(8)),
        }
    }

    pub fn should_dismiss(&self) -> bool {
        self.auto_dismiss
            .is_some_and(|duration| self.shown_at.elapsed() > duration)
    }
}

/// Log entry for the message area
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub message: String,
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogEntry {
    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

/// Main application state
#[derive(Debug)]
pub struct App {
    pub should_quit: bool,

    /// Events in chronological order
    pub events: Vec<TimelineEvent>,
    pub bounds: TimelineBounds,
    pub axis: AxisConfig,
    /// Period labels for the current events
    pub labels: Vec<AxisLabel>,
    source: EventSource,

    pub viewport: Viewport,
    pub tracker: ScrollTracker,

    pub show_minimap: bool,
    pub show_help: bool,
    pub error_popup: Option<ErrorPopup>,

    pub logs: Vec<LogEntry>,
    max_logs: usize,

    pub is_loading: bool,

    /// Terminal area of the last frame
    area: Rect,
    /// Card pane size the current card layout was computed for
    laid_out_for: Option<(u16, u16)>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let viewport = Viewport::new();
        let tracker = ScrollTracker::mount(&viewport);
        let labels = axis_labels(&[], &settings.axis);

        let mut app = Self {
            should_quit: false,
            events: Vec::new(),
            bounds: settings.bounds,
            axis: settings.axis,
            labels,
            source: settings.source,
            viewport,
            tracker,
            show_minimap: settings.show_minimap,
            show_help: false,
            error_popup: None,
            logs: Vec::new(),
            max_logs: 100,
            is_loading: true,
            area: Rect::default(),
            laid_out_for: None,
        };

        app.log(LogEntry::info(format!("Loading events from {}...", app.source)));
        app
    }

    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    pub fn show_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let title = title.into();
        let message = message.into();
        self.log(LogEntry::error(format!("{title}: {message}")));
        self.error_popup = Some(ErrorPopup::new(title, message));
    }

    pub fn dismiss_error(&mut self) {
        self.error_popup = None;
    }

    /// Index of the active event, `None` while there are no events.
    pub fn active(&self) -> Option<usize> {
        let last = self.events.len().checked_sub(1)?;
        Some(self.tracker.active().min(last))
    }

    pub fn active_event(&self) -> Option<&TimelineEvent> {
        self.active().and_then(|index| self.events.get(index))
    }

    /// Track position of the progress marker.
    pub fn marker_position(&self) -> Option<f64> {
        self.active_event()
            .and_then(|event| event_marker_position(event, &self.bounds))
    }

    /// Record the terminal size and re-lay out the cards if the card pane
    /// changed size.
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.relayout();
    }

    fn relayout(&mut self) {
        let cards = screen_layout(self.area, self.show_minimap, self.events.len()).cards;
        let size = (cards.width, cards.height);
        if self.laid_out_for == Some(size) {
            return;
        }
        self.viewport
            .set_layout(f64::from(cards.height), layout_cards(&self.events, cards.width));
        self.laid_out_for = Some(size);
    }

    /// Replace the event collection.
    fn set_events(&mut self, events: Vec<TimelineEvent>) {
        self.events = events;
        self.labels = axis_labels(&self.events, &self.axis);
        self.laid_out_for = None;
        self.viewport.scroll_to_top();
        self.relayout();
        self.tracker.reset(&self.viewport);
    }

    pub fn handle_loader_message(&mut self, message: LoaderMessage) {
        match message {
            LoaderMessage::EventsLoaded(loaded) => {
                self.is_loading = false;
                let count = loaded.events.len();
                self.set_events(loaded.events);
                self.log(LogEntry::success(format!(
                    "Loaded {count} events from {}",
                    self.source
                )));
                for warning in loaded.warnings {
                    self.log(LogEntry::warning(warning));
                }
            }
            LoaderMessage::Error(error) => {
                self.is_loading = false;
                self.show_error("Load Error", error);
            }
        }
    }

    /// Scroll event `index` to the centre of the card pane.
    ///
    /// Returns `false` when there is no such card.
    pub fn navigate_to(&mut self, index: usize) -> bool {
        self.viewport.scroll_into_view(index)
    }

    /// Event a relative jump starts from: the target of an in-flight
    /// navigation, otherwise the active event.
    fn navigation_origin(&self) -> Option<usize> {
        self.viewport
            .pending()
            .map(|pending| pending.index)
            .or_else(|| self.active())
    }

    fn navigate_next(&mut self) {
        if let Some(index) = self.navigation_origin() {
            self.navigate_to(index + 1);
        }
    }

    fn navigate_previous(&mut self) {
        if let Some(index) = self.navigation_origin().and_then(|i| i.checked_sub(1)) {
            self.navigate_to(index);
        }
    }

    pub fn toggle_minimap(&mut self) {
        self.show_minimap = !self.show_minimap;
        let state = if self.show_minimap { "shown" } else { "hidden" };
        tracing::debug!(show_minimap = self.show_minimap, "overview toggled");
        self.log(LogEntry::info(format!("Timeline overview {state}")));
    }

    /// Handle key events and return an optional loader command
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<LoaderCommand> {
        if self.error_popup.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                self.dismiss_error();
            }
            return None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                self.show_help = false;
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return Some(LoaderCommand::Shutdown);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Some(LoaderCommand::Shutdown);
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('m') => self.toggle_minimap(),
            KeyCode::Char('r') => {
                self.is_loading = true;
                self.log(LogEntry::info("Reloading events..."));
                return Some(LoaderCommand::Load);
            }
            KeyCode::Char('j') | KeyCode::Down => self.viewport.scroll_by(1.0),
            KeyCode::Char('k') | KeyCode::Up => self.viewport.scroll_by(-1.0),
            KeyCode::PageDown | KeyCode::Char(' ') => self.viewport.page_down(),
            KeyCode::PageUp => self.viewport.page_up(),
            KeyCode::Char('g') | KeyCode::Home => self.viewport.scroll_to_top(),
            KeyCode::Char('G') | KeyCode::End => self.viewport.scroll_to_bottom(),
            KeyCode::Char('n') => self.navigate_next(),
            KeyCode::Char('p') => self.navigate_previous(),
            _ => {}
        }
        None
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.error_popup.is_some() || self.show_help {
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollDown => self.viewport.scroll_by(WHEEL_STEP),
            MouseEventKind::ScrollUp => self.viewport.scroll_by(-WHEEL_STEP),
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(mouse.column, mouse.row),
            _ => {}
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        let layout = screen_layout(self.area, self.show_minimap, self.events.len());
        let position = Position::new(column, row);

        if layout.toggle_hint.contains(position) {
            self.toggle_minimap();
            return;
        }

        // The overview sits on top of the cards and swallows clicks.
        if let Some(minimap) = layout.minimap.filter(|m| m.contains(position)) {
            let inner = minimap_inner(minimap);
            if let Some(index) = minimap_entry_at(inner, row, self.events.len(), self.active()) {
                self.navigate_to(index);
            }
            return;
        }

        if layout.cards.contains(position) {
            let doc_row = self.viewport.first_visible_row() + i64::from(row - layout.cards.y);
            if let Some(index) = self.viewport.card_at(doc_row as f64) {
                self.navigate_to(index);
            }
        }
    }

    /// Advance animations and let the tracker catch up (called every frame)
    pub fn tick(&mut self) {
        self.viewport.tick();
        if let Some(index) = self.tracker.poll(&self.viewport) {
            tracing::debug!(index, "active event changed");
        }

        if self.error_popup.as_ref().is_some_and(ErrorPopup::should_dismiss) {
            self.error_popup = None;
        }
    }

    /// How far down the card document the pane is scrolled.
    pub fn scroll_percent(&self) -> u8 {
        let scrollable = self.viewport.document_height() - self.viewport.height();
        if scrollable <= 0.0 {
            return 100;
        }
        (self.viewport.offset() / scrollable * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Get the status bar text
    pub fn status_text(&self) -> String {
        if self.is_loading {
            return "Loading... | ?: Help | q: Quit".to_string();
        }
        let current = match self.active_event() {
            Some(event) => format!("{} {}", event.start_date, event.display_headline()),
            None => "No events".to_string(),
        };
        format!(
            "{current} | {} events | {:>3}% | n/p: Next/Prev | ?: Help | q: Quit",
            self.events.len(),
            self.scroll_percent()
        )
    }
}

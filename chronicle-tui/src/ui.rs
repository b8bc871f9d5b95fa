//! UI rendering module.
//!
//! Screen geometry lives in [`screen_layout`] so that drawing and mouse hit
//! testing always agree on where things are.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, LogLevel};
use crate::theme::{colors, styles};
use crate::timeline::{minimap_block, CardsWidget, MiniMapWidget, SpineWidget};

/// Width of the spine column, borders included.
const SPINE_WIDTH: u16 = 16;
/// Widest the overview gets.
const MINIMAP_WIDTH: u16 = 44;

/// Where every part of the screen goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    /// Overview toggle hint inside the header
    pub toggle_hint: Rect,
    /// Outer area of the spine pane
    pub spine_pane: Rect,
    /// Track area inside the spine pane
    pub spine: Rect,
    /// Outer area of the card pane
    pub cards_pane: Rect,
    /// Card viewport inside the card pane
    pub cards: Rect,
    /// Overview overlay, when shown
    pub minimap: Option<Rect>,
    pub logs: Rect,
}

/// Label of the overview toggle.
pub fn overview_hint(show_minimap: bool) -> &'static str {
    if show_minimap {
        "[m] Hide Overview"
    } else {
        "[m] Show Overview"
    }
}

pub fn screen_layout(area: Rect, show_minimap: bool, entries: usize) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Spine + cards
            Constraint::Length(5), // Log area
        ])
        .split(area);
    let (header, body, logs) = (rows[0], rows[1], rows[2]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SPINE_WIDTH), Constraint::Min(20)])
        .split(body);
    let (spine_pane, cards_pane) = (columns[0], columns[1]);

    let pane_block = Block::default().borders(Borders::ALL);
    let spine = pane_block.inner(spine_pane);
    let cards = pane_block.inner(cards_pane);

    let hint_width = overview_hint(show_minimap).width() as u16;
    let hint_x = header
        .right()
        .saturating_sub(hint_width + 2)
        .max(header.x);
    let toggle_hint = Rect::new(
        hint_x,
        header.y + 1u16.min(header.height),
        hint_width.min(header.width),
        1u16.min(header.height),
    );

    let minimap = show_minimap.then(|| {
        let width = MINIMAP_WIDTH.min(cards.width);
        let wanted = u16::try_from(entries).unwrap_or(u16::MAX).saturating_add(2);
        let height = wanted.max(3).min(cards.height);
        Rect::new(cards.right().saturating_sub(width), cards.y, width, height)
    });

    ScreenLayout {
        header,
        toggle_hint,
        spine_pane,
        spine,
        cards_pane,
        cards,
        minimap,
        logs,
    }
}

/// Inner area of the overview, where entries are drawn.
pub fn minimap_inner(minimap: Rect) -> Rect {
    minimap_block().inner(minimap)
}

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors::BG_DARK));
    frame.render_widget(bg_block, area);

    let layout = screen_layout(area, app.show_minimap, app.events.len());

    render_header(frame, app, &layout);
    render_spine(frame, app, &layout);
    render_cards(frame, app, &layout);
    if let Some(minimap) = layout.minimap {
        frame.render_widget(MiniMapWidget::new(&app.events, app.active()), minimap);
    }
    render_logs(frame, app, layout.logs);

    if app.error_popup.is_some() {
        render_error_popup(frame, app, area);
    }
    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, layout: &ScreenLayout) {
    let block = Block::default()
        .title(" Chronicle ")
        .title_style(styles::title())
        .borders(Borders::ALL)
        .border_style(styles::border())
        .style(Style::default().bg(colors::BG_MEDIUM));
    let inner = block.inner(layout.header);
    frame.render_widget(block, layout.header);

    let status = Paragraph::new(Line::from(Span::styled(app.status_text(), styles::text_dim())));
    frame.render_widget(status, inner);

    let hint = Paragraph::new(Span::styled(
        overview_hint(app.show_minimap),
        styles::key_hint(),
    ));
    frame.render_widget(hint, layout.toggle_hint);
}

fn render_spine(frame: &mut Frame, app: &App, layout: &ScreenLayout) {
    let block = Block::default()
        .title(" Progress ")
        .title_style(styles::text_dim())
        .borders(Borders::ALL)
        .border_style(styles::border_dim());
    frame.render_widget(block, layout.spine_pane);
    frame.render_widget(
        SpineWidget::new(&app.labels, app.marker_position()),
        layout.spine,
    );
}

fn render_cards(frame: &mut Frame, app: &App, layout: &ScreenLayout) {
    let title = match app.active() {
        Some(index) => format!(" Events {}/{} ", index + 1, app.events.len()),
        None => " Events ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_accent())
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(styles::border());
    frame.render_widget(block, layout.cards_pane);

    if app.events.is_empty() {
        render_empty_state(frame, layout.cards, app.is_loading);
        return;
    }

    let cards = CardsWidget::new(
        &app.events,
        app.viewport.cards(),
        app.viewport.first_visible_row(),
    )
    .active(app.active());
    frame.render_widget(cards, layout.cards);
}

fn render_empty_state(frame: &mut Frame, area: Rect, is_loading: bool) {
    if area.height == 0 {
        return;
    }
    let text = if is_loading {
        "Loading..."
    } else {
        "No events to show"
    };
    let paragraph = Paragraph::new(text)
        .style(styles::text_dim())
        .alignment(Alignment::Center);
    let centered = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    frame.render_widget(paragraph, centered);
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            let (prefix, style) = match entry.level {
                LogLevel::Info => ("i", styles::info()),
                LogLevel::Success => ("+", styles::success()),
                LogLevel::Warning => ("!", styles::warning()),
                LogLevel::Error => ("x", styles::error()),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("[{prefix}] "), style),
                Span::styled(entry.message.as_str(), styles::text_dim()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Log ")
            .title_style(styles::text_dim())
            .borders(Borders::ALL)
            .border_style(styles::border_dim())
            .style(Style::default().bg(colors::BG_DARK)),
    );

    frame.render_widget(list, area);
}

fn render_error_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(popup) = app.error_popup.as_ref() else {
        return;
    };

    let popup_width = (area.width / 5 * 3).clamp(30, 60);
    let popup_area = centered_rect(popup_width, 7, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", popup.title))
        .title_style(
            Style::default()
                .fg(Color::White)
                .bg(colors::RED)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(styles::error())
        .style(Style::default().bg(Color::Rgb(0x2A, 0x18, 0x18)));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = Paragraph::new(popup.message.as_str())
        .style(styles::text())
        .wrap(Wrap { trim: true });
    frame.render_widget(text, inner);

    let hint = Paragraph::new("Press ESC or ENTER to dismiss")
        .style(styles::text_hint())
        .alignment(Alignment::Center);
    let hint_area = Rect::new(
        popup_area.x,
        popup_area.bottom().saturating_sub(1),
        popup_area.width,
        1,
    );
    frame.render_widget(hint, hint_area);
}

fn help_line(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {keys:<18}"), Style::default().fg(colors::BLUE)),
        Span::raw(action),
    ])
}

fn help_section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(colors::PURPLE)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        help_section("Scrolling"),
        help_line("j/k, Up/Down", "Scroll one line"),
        help_line("PgUp/PgDn, Space", "Scroll one page"),
        help_line("g/Home, G/End", "Jump to top / bottom"),
        help_line("Mouse wheel", "Scroll"),
        Line::from(""),
        help_section("Events"),
        help_line("n / p", "Next / previous event"),
        help_line("Click card", "Centre that event"),
        help_line("m", "Toggle timeline overview"),
        help_line("Click overview", "Jump to that event"),
        Line::from(""),
        help_section("General"),
        help_line("r", "Reload events"),
        help_line("?", "Toggle this help"),
        help_line("q / Ctrl+C", "Quit"),
    ];

    let popup_area = centered_rect(52, help_text.len() as u16 + 2, area);
    frame.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(styles::title())
                .borders(Borders::ALL)
                .border_style(styles::border())
                .style(styles::modal_content_bg()),
        )
        .style(styles::text());

    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

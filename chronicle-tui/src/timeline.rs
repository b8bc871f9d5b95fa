//! Timeline widgets.
//!
//! - [`SpineWidget`]: the vertical time axis with period labels and the
//!   progress marker
//! - [`CardsWidget`]: the scrollable stack of event cards
//! - [`MiniMapWidget`]: the overview list used for direct navigation

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, BorderType, Clear, Padding, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::axis::{AxisLabel, TRACK_SPAN, TRACK_START};
use crate::layout::{card_lines, truncate_to_width};
use crate::models::TimelineEvent;
use crate::theme::styles;
use crate::tracker::CardRect;

const TRACK_CHAR: &str = "│";
const TRACK_DONE_CHAR: &str = "┃";
const TICK_CHAR: &str = "┤";
const MARKER_CHAR: &str = "●";

/// Row of a track percentage inside a spine `height` rows tall.
///
/// `None` when the percentage falls outside the spine.
pub fn pct_to_row(pct: f64, height: u16) -> Option<u16> {
    if height == 0 || !(0.0..=100.0).contains(&pct) {
        return None;
    }
    let last = f64::from(height - 1);
    Some((pct / 100.0 * last).round() as u16)
}

/// Vertical time axis.
pub struct SpineWidget<'a> {
    labels: &'a [AxisLabel],
    marker: Option<f64>,
}

impl<'a> SpineWidget<'a> {
    pub fn new(labels: &'a [AxisLabel], marker: Option<f64>) -> Self {
        Self { labels, marker }
    }
}

impl Widget for SpineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let spine_x = area.right() - 2;

        let (Some(first), Some(last)) = (
            pct_to_row(TRACK_START, area.height),
            pct_to_row(TRACK_START + TRACK_SPAN, area.height),
        ) else {
            return;
        };
        let marker_row = self.marker.and_then(|pct| pct_to_row(pct, area.height));

        for row in first..=last {
            let done = marker_row.is_some_and(|m| row < m);
            let (symbol, style) = if done {
                (TRACK_DONE_CHAR, styles::track_done())
            } else {
                (TRACK_CHAR, styles::track())
            };
            buf.set_string(spine_x, area.y + row, symbol, style);
        }

        let label_width = usize::from(spine_x.saturating_sub(area.x + 1));
        for label in self.labels {
            let Some(row) = pct_to_row(label.position, area.height) else {
                continue;
            };
            buf.set_string(spine_x, area.y + row, TICK_CHAR, styles::track());

            let text = truncate_to_width(&label.label, label_width);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            let x = spine_x.saturating_sub(width.saturating_add(1)).max(area.x);
            buf.set_string(x, area.y + row, text, styles::axis_label());
        }

        if let Some(row) = marker_row {
            buf.set_string(spine_x, area.y + row, MARKER_CHAR, styles::marker());
        }
    }
}

/// The visible slice of the card document.
pub struct CardsWidget<'a> {
    events: &'a [TimelineEvent],
    cards: &'a [CardRect],
    first_row: i64,
    active: Option<usize>,
}

impl<'a> CardsWidget<'a> {
    pub fn new(events: &'a [TimelineEvent], cards: &'a [CardRect], first_row: i64) -> Self {
        Self {
            events,
            cards,
            first_row,
            active: None,
        }
    }

    pub fn active(mut self, active: Option<usize>) -> Self {
        self.active = active;
        self
    }

    /// Draw one card into its own buffer so partially visible cards can be
    /// clipped row by row.
    fn render_card(&self, index: usize, width: u16, height: u16) -> Option<Buffer> {
        let event = self.events.get(index)?;
        let rect = Rect::new(0, 0, width, height);
        let mut scratch = Buffer::empty(rect);

        let is_active = self.active == Some(index);
        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(1));
        block = if is_active {
            block
                .border_style(styles::card_border_active())
                .style(styles::card_active_bg())
        } else {
            block.border_style(styles::card_border())
        };

        let inner = block.inner(rect);
        block.render(rect, &mut scratch);
        Paragraph::new(card_lines(event, inner.width)).render(inner, &mut scratch);
        Some(scratch)
    }
}

impl Widget for CardsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let view_top = self.first_row;
        let view_bottom = view_top + i64::from(area.height);

        for (index, card) in self.cards.iter().enumerate() {
            let top = card.top as i64;
            let height = card.height as i64;
            if top + height <= view_top || top >= view_bottom {
                continue;
            }
            let Ok(card_height) = u16::try_from(height) else {
                continue;
            };
            let Some(scratch) = self.render_card(index, area.width, card_height) else {
                continue;
            };

            for r in 0..card_height {
                let screen_row = top + i64::from(r) - view_top;
                if !(0..i64::from(area.height)).contains(&screen_row) {
                    continue;
                }
                let y = area.y + screen_row as u16;
                for x in 0..area.width {
                    buf[(area.x + x, y)] = scratch[(x, r)].clone();
                }
            }
        }
    }
}

/// First entry shown by an overview `rows` tall, keeping `active` in view.
pub fn minimap_window(len: usize, rows: usize, active: Option<usize>) -> usize {
    if rows == 0 || len <= rows {
        return 0;
    }
    let active = active.unwrap_or(0).min(len - 1);
    active.saturating_sub(rows / 2).min(len - rows)
}

/// Entry under screen row `row` of the overview's inner area.
pub fn minimap_entry_at(inner: Rect, row: u16, len: usize, active: Option<usize>) -> Option<usize> {
    if row < inner.y || row >= inner.bottom() {
        return None;
    }
    let start = minimap_window(len, usize::from(inner.height), active);
    let index = start + usize::from(row - inner.y);
    (index < len).then_some(index)
}

/// Block around the overview; shared with hit testing.
pub fn minimap_block() -> Block<'static> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(styles::border())
        .title(" Timeline Overview ")
        .title_style(styles::title_accent())
        .style(styles::minimap_bg())
}

/// Overview of all events, one row each.
pub struct MiniMapWidget<'a> {
    events: &'a [TimelineEvent],
    active: Option<usize>,
}

impl<'a> MiniMapWidget<'a> {
    pub fn new(events: &'a [TimelineEvent], active: Option<usize>) -> Self {
        Self { events, active }
    }
}

impl Widget for MiniMapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = minimap_block();
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let start = minimap_window(self.events.len(), usize::from(inner.height), self.active);
        let visible = self
            .events
            .iter()
            .enumerate()
            .skip(start)
            .take(usize::from(inner.height));

        for (row, (index, event)) in visible.enumerate() {
            let y = inner.y + row as u16;
            let is_active = self.active == Some(index);
            let style = if is_active {
                styles::minimap_active()
            } else {
                styles::minimap_entry()
            };

            let date = format!("{}-{:02}", event.start_date.year, event.start_date.month);
            let text = format!(" {date}  {}", event.display_headline());
            if is_active {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), style);
            }
            buf.set_stringn(inner.x, y, &text, usize::from(inner.width), style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventDate;
    use pretty_assertions::assert_eq;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(buf.area.x + x, y)].symbol().to_string())
            .collect()
    }

    fn events(n: usize) -> Vec<TimelineEvent> {
        (0..n)
            .map(|i| TimelineEvent::new(EventDate::new(2023, 1 + i as i32 % 12, 1), format!("Event {i}"), ""))
            .collect()
    }

    #[test]
    fn test_pct_to_row() {
        assert_eq!(pct_to_row(0.0, 51), Some(0));
        assert_eq!(pct_to_row(100.0, 51), Some(50));
        assert_eq!(pct_to_row(50.0, 51), Some(25));
        assert_eq!(pct_to_row(-1.0, 51), None);
        assert_eq!(pct_to_row(101.0, 51), None);
        assert_eq!(pct_to_row(50.0, 0), None);
    }

    #[test]
    fn test_spine_draws_labels_and_marker() {
        let labels = vec![
            AxisLabel { label: "Late 2022".into(), position: 8.0 },
            AxisLabel { label: "Early 2025".into(), position: 92.0 },
        ];
        let area = Rect::new(0, 0, 14, 26);
        let mut buf = Buffer::empty(area);
        SpineWidget::new(&labels, Some(50.0)).render(area, &mut buf);

        // 8% of 25 rows rounds to row 2, 92% to row 23, 50% to row 13.
        assert!(row_text(&buf, 2).contains("Late 2022"));
        assert!(row_text(&buf, 23).contains("Early 2025"));
        assert_eq!(buf[(12, 13)].symbol(), MARKER_CHAR);
        assert_eq!(buf[(12, 5)].symbol(), TRACK_DONE_CHAR);
        assert_eq!(buf[(12, 20)].symbol(), TRACK_CHAR);
    }

    #[test]
    fn test_spine_skips_off_track_marker() {
        let area = Rect::new(0, 0, 14, 26);
        let mut buf = Buffer::empty(area);
        SpineWidget::new(&[], Some(140.0)).render(area, &mut buf);
        let markers = (0..26).filter(|&y| buf[(12, y)].symbol() == MARKER_CHAR).count();
        assert_eq!(markers, 0);
    }

    #[test]
    fn test_cards_are_clipped_to_the_view() {
        let events = events(2);
        let cards = vec![CardRect::new(2.0, 4.0), CardRect::new(7.0, 4.0)];
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        // View starts at document row 4: rows 4-5 of card 0, gap, rows 7-8 of card 1.
        CardsWidget::new(&events, &cards, 4).render(area, &mut buf);

        assert!(row_text(&buf, 0).contains("Event 0"));
        assert!(row_text(&buf, 1).starts_with("╰"));
        assert_eq!(row_text(&buf, 2).trim(), "");
        assert!(row_text(&buf, 3).starts_with("╭"));
        assert!(row_text(&buf, 4).contains("2023-02-01"));
    }

    #[test]
    fn test_active_card_uses_accent_border() {
        let events = events(1);
        let cards = vec![CardRect::new(0.0, 4.0)];
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        CardsWidget::new(&events, &cards, 0)
            .active(Some(0))
            .render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, styles::card_border_active().fg.unwrap());
    }

    #[test]
    fn test_minimap_window_follows_active() {
        assert_eq!(minimap_window(5, 10, Some(4)), 0);
        assert_eq!(minimap_window(30, 10, Some(0)), 0);
        assert_eq!(minimap_window(30, 10, Some(15)), 10);
        assert_eq!(minimap_window(30, 10, Some(29)), 20);
        assert_eq!(minimap_window(30, 0, Some(3)), 0);
    }

    #[test]
    fn test_minimap_hit_testing() {
        let inner = Rect::new(10, 5, 20, 4);
        assert_eq!(minimap_entry_at(inner, 4, 3, None), None);
        assert_eq!(minimap_entry_at(inner, 5, 3, None), Some(0));
        assert_eq!(minimap_entry_at(inner, 7, 3, None), Some(2));
        assert_eq!(minimap_entry_at(inner, 8, 3, None), None);
        // Scrolled window: 30 entries, active 15 starts the window at 13.
        assert_eq!(minimap_entry_at(inner, 5, 30, Some(15)), Some(13));
    }

    #[test]
    fn test_minimap_renders_title_and_entries() {
        let events = events(3);
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        MiniMapWidget::new(&events, Some(1)).render(area, &mut buf);
        assert!(row_text(&buf, 0).contains("Timeline Overview"));
        assert!(row_text(&buf, 1).contains("2023-01  Event 0"));
        assert!(row_text(&buf, 2).contains("2023-02  Event 1"));
        assert_eq!(buf[(2, 2)].bg, styles::minimap_active().bg.unwrap());
    }
}

//! Card layout.
//!
//! Turns the event list into the scrollable "document" of the card pane:
//! every card's content is wrapped to the pane width, giving its height,
//! and cards are stacked top to bottom with a gap between them. The same
//! line builder is used when drawing, so measured and drawn heights agree.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::markup::{self, MarkupLine};
use crate::models::TimelineEvent;
use crate::theme::styles;
use crate::tracker::CardRect;

/// Empty rows above the first and below the last card.
pub const PADDING_ROWS: u16 = 2;
/// Empty rows between two cards.
pub const CARD_GAP: u16 = 1;
/// Columns taken by card borders and inner padding.
pub const CARD_CHROME_WIDTH: u16 = 4;
/// Rows taken by card borders.
pub const CARD_CHROME_HEIGHT: u16 = 2;

const BULLET: &str = "• ";
const BULLET_INDENT: &str = "  ";

/// Card rectangles and total height of the card document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardLayout {
    pub cards: Vec<CardRect>,
    pub document_height: f64,
}

/// Stack all cards for a pane `pane_width` columns wide.
pub fn layout_cards(events: &[TimelineEvent], pane_width: u16) -> CardLayout {
    let inner_width = pane_width.saturating_sub(CARD_CHROME_WIDTH);
    let mut top = f64::from(PADDING_ROWS);
    let mut cards = Vec::with_capacity(events.len());

    for event in events {
        let height = card_lines(event, inner_width).len() as f64 + f64::from(CARD_CHROME_HEIGHT);
        cards.push(CardRect::new(top, height));
        top += height + f64::from(CARD_GAP);
    }

    let content_bottom = cards.last().map_or(f64::from(PADDING_ROWS), CardRect::bottom);
    CardLayout {
        cards,
        document_height: content_bottom + f64::from(PADDING_ROWS),
    }
}

/// Content lines of a card: date, headline, then the sanitised body.
pub fn card_lines(event: &TimelineEvent, inner_width: u16) -> Vec<Line<'static>> {
    let width = usize::from(inner_width.max(1));
    let mut lines = vec![Line::from(Span::styled(
        event.start_date.to_string(),
        styles::card_date(),
    ))];

    let headline = [Span::styled(
        event.display_headline().to_string(),
        styles::card_headline(),
    )];
    lines.extend(wrap_spans(&headline, width));

    let body = markup::sanitize(&event.text.body);
    if !body.is_empty() {
        lines.push(Line::default());
        for line in &body {
            lines.extend(body_lines(line, width));
        }
    }
    lines
}

fn body_lines(line: &MarkupLine, width: usize) -> Vec<Line<'static>> {
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|span| {
            let mut style = styles::card_body();
            if span.bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            if span.italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            Span::styled(span.text.clone(), style)
        })
        .collect();

    if !line.bullet {
        let mut wrapped = wrap_spans(&spans, width);
        if wrapped.is_empty() {
            wrapped.push(Line::default());
        }
        return wrapped;
    }

    let indent = BULLET.width();
    let mut wrapped = wrap_spans(&spans, width.saturating_sub(indent).max(1));
    if wrapped.is_empty() {
        wrapped.push(Line::default());
    }
    for (i, line) in wrapped.iter_mut().enumerate() {
        let prefix = if i == 0 { BULLET } else { BULLET_INDENT };
        line.spans.insert(0, Span::styled(prefix, styles::card_bullet()));
    }
    wrapped
}

/// Greedy word wrap over styled spans.
///
/// Words longer than `width` are split across lines.
pub fn wrap_spans(spans: &[Span<'_>], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);

    // (word, style, preceded by whitespace)
    let mut words: Vec<(String, Style, bool)> = Vec::new();
    let mut space = false;
    for span in spans {
        let mut word = String::new();
        for c in span.content.chars() {
            if c.is_whitespace() {
                if !word.is_empty() {
                    words.push((std::mem::take(&mut word), span.style, space));
                }
                space = true;
            } else {
                word.push(c);
            }
        }
        if !word.is_empty() {
            words.push((word, span.style, space));
            space = false;
        }
    }

    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;

    for (word, style, space_before) in words {
        let len = word.width();
        let gap = usize::from(space_before && used > 0);
        if used > 0 && used + gap + len > width {
            lines.push(Line::from(std::mem::take(&mut current)));
            used = 0;
        }
        if space_before && used > 0 {
            current.push(Span::styled(" ", style));
            used += 1;
        }

        if used + len <= width {
            current.push(Span::styled(word, style));
            used += len;
            continue;
        }

        // Only reached at the start of a line: hard-split the word by
        // display width. A glyph wider than the line still gets a line.
        let mut chunk = String::new();
        let mut chunk_width = 0;
        for c in word.chars() {
            let w = c.width().unwrap_or(0);
            if chunk_width > 0 && chunk_width + w > width {
                current.push(Span::styled(std::mem::take(&mut chunk), style));
                lines.push(Line::from(std::mem::take(&mut current)));
                chunk_width = 0;
            }
            chunk.push(c);
            chunk_width += w;
        }
        current.push(Span::styled(chunk, style));
        used = chunk_width;
    }

    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

/// Longest prefix of `text` that fits in `width` terminal columns.
pub fn truncate_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (i, c) in text.char_indices() {
        used += c.width().unwrap_or(0);
        if used > width {
            return &text[..i];
        }
    }
    text
}

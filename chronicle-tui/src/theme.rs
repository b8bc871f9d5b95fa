//! Ink-wash colour theme.
//!
//! A low-contrast, warm, dark palette. The spine and the active card share
//! the accent colour so the eye can connect the marker to the card it
//! stands for.

use ratatui::style::Color;

pub mod colors {
    use super::Color;

    // Backgrounds
    pub const BG_DARK: Color = Color::Rgb(0x18, 0x16, 0x16);
    pub const BG_MEDIUM: Color = Color::Rgb(0x1D, 0x1C, 0x19);
    pub const BG_HIGHLIGHT: Color = Color::Rgb(0x28, 0x27, 0x27);

    // Foregrounds
    pub const FG_PRIMARY: Color = Color::Rgb(0xC5, 0xC9, 0xC5);
    pub const FG_DIM: Color = Color::Rgb(0x72, 0x71, 0x69);
    pub const FG_HINT: Color = Color::Rgb(0x54, 0x54, 0x54);

    // Accents
    pub const RED: Color = Color::Rgb(0xC4, 0x74, 0x6E);
    pub const GREEN: Color = Color::Rgb(0x8A, 0x9A, 0x7B);
    pub const YELLOW: Color = Color::Rgb(0xC4, 0xB2, 0x8A);
    pub const ORANGE: Color = Color::Rgb(0xB6, 0x92, 0x7B);
    pub const BLUE: Color = Color::Rgb(0x8B, 0xA4, 0xB0);
    pub const PURPLE: Color = Color::Rgb(0x95, 0x7F, 0xB8);

    // Borders
    pub const BORDER: Color = Color::Rgb(0x72, 0x71, 0x69);
    pub const BORDER_DIM: Color = Color::Rgb(0x3A, 0x3A, 0x3A);

    /// Progress marker and active card
    pub const ACCENT: Color = YELLOW;
    /// Unfilled part of the spine
    pub const TRACK: Color = BORDER_DIM;
    /// Filled part of the spine, above the marker
    pub const TRACK_DONE: Color = ORANGE;
}

pub mod styles {
    use ratatui::style::{Modifier, Style};

    use super::colors;

    pub fn text() -> Style {
        Style::default().fg(colors::FG_PRIMARY)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn text_hint() -> Style {
        Style::default().fg(colors::FG_HINT)
    }

    pub fn success() -> Style {
        Style::default().fg(colors::GREEN)
    }

    pub fn error() -> Style {
        Style::default().fg(colors::RED)
    }

    pub fn warning() -> Style {
        Style::default().fg(colors::YELLOW)
    }

    pub fn info() -> Style {
        Style::default().fg(colors::BLUE)
    }

    pub fn border() -> Style {
        Style::default().fg(colors::BORDER)
    }

    pub fn border_dim() -> Style {
        Style::default().fg(colors::BORDER_DIM)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_accent() -> Style {
        Style::default()
            .fg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint in the header bar
    pub fn key_hint() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::FG_DIM)
    }

    // === Spine ===

    pub fn track() -> Style {
        Style::default().fg(colors::TRACK)
    }

    pub fn track_done() -> Style {
        Style::default().fg(colors::TRACK_DONE)
    }

    pub fn marker() -> Style {
        Style::default()
            .fg(colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn axis_label() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    // === Cards ===

    pub fn card_border() -> Style {
        Style::default().fg(colors::BORDER_DIM)
    }

    pub fn card_border_active() -> Style {
        Style::default()
            .fg(colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_active_bg() -> Style {
        Style::default().bg(colors::BG_HIGHLIGHT)
    }

    pub fn card_date() -> Style {
        Style::default().fg(colors::PURPLE)
    }

    pub fn card_headline() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_body() -> Style {
        Style::default().fg(colors::FG_PRIMARY)
    }

    pub fn card_bullet() -> Style {
        Style::default().fg(colors::ORANGE)
    }

    // === Overview ===

    pub fn minimap_bg() -> Style {
        Style::default().bg(colors::BG_MEDIUM)
    }

    pub fn minimap_entry() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn minimap_active() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    // === Overlays ===

    pub fn modal_content_bg() -> Style {
        Style::default().bg(colors::BG_MEDIUM)
    }
}

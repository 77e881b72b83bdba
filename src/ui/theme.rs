//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme; every widget pulls its styles from here.
pub struct Theme;

impl Theme {
    // ── inspector rows ─────────────────────────────────────────
    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn value_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn muted_style() -> Style {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn separator_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn hint_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn selected_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn paused_style() -> Style {
        Style::default()
            .bg(Color::Red)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn editor_style() -> Style {
        Style::default().fg(Color::Yellow)
    }
}

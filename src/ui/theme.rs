use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub struct Theme;

impl Theme {
    pub const BG_SURFACE: Color = Color::Rgb(24, 26, 32);
    pub const BG_ELEVATED: Color = Color::Rgb(36, 39, 48);
    pub const BORDER_DIM: Color = Color::Rgb(70, 74, 86);
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 222, 228);
    pub const TEXT_MUTED: Color = Color::Rgb(120, 124, 136);
    pub const ACCENT_TEAL: Color = Color::Rgb(80, 200, 210);
    pub const ACCENT_AMBER: Color = Color::Rgb(230, 180, 80);
    pub const ACCENT_LAVENDER: Color = Color::Rgb(175, 140, 220);
    pub const ACCENT_RED: Color = Color::Rgb(230, 100, 100);

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT_TEAL)
    }

    pub fn border_type() -> BorderType {
        BorderType::Rounded
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn panel() -> Style {
        Style::default().bg(Self::BG_SURFACE)
    }

    pub fn timestamp() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    pub fn system_message() -> Style {
        Style::default().fg(Self::ACCENT_AMBER)
    }

    pub fn navigation_message() -> Style {
        Style::default().fg(Self::ACCENT_TEAL)
    }

    pub fn error_message() -> Style {
        Style::default().fg(Self::ACCENT_RED)
    }

    pub fn heading() -> Style {
        Style::default()
            .fg(Self::ACCENT_LAVENDER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn link() -> Style {
        Style::default()
            .fg(Self::ACCENT_TEAL)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn markup_tag() -> Style {
        Style::default().fg(Self::ACCENT_LAVENDER)
    }

    pub fn state_key() -> Style {
        Style::default().fg(Self::ACCENT_AMBER)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY).bg(Self::BG_ELEVATED)
    }

    pub fn address_bar() -> Style {
        Style::default().fg(Self::ACCENT_TEAL).bg(Self::BG_ELEVATED)
    }
}

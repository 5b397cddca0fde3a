use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let arrow = |enabled: bool, symbol: &'static str| {
        let fg = if enabled {
            Theme::ACCENT_TEAL
        } else {
            Theme::BORDER_DIM
        };
        Span::styled(symbol, Style::default().fg(fg).bg(Theme::BG_ELEVATED))
    };

    let mut parts = vec![
        arrow(state.can_go_back, " ◀ "),
        arrow(state.can_go_forward, "▶ "),
        Span::styled(
            "│ ",
            Style::default().fg(Theme::BORDER_DIM).bg(Theme::BG_ELEVATED),
        ),
        Span::styled(
            state.location.clone(),
            Theme::address_bar().add_modifier(Modifier::BOLD),
        ),
    ];

    if let Some(ref component) = state.component {
        parts.push(Span::styled(
            "  │ ",
            Style::default().fg(Theme::BORDER_DIM).bg(Theme::BG_ELEVATED),
        ));
        parts.push(Span::styled(
            format!("<{component}>"),
            Style::default()
                .fg(Theme::ACCENT_LAVENDER)
                .bg(Theme::BG_ELEVATED),
        ));
    }

    let paragraph = Paragraph::new(Line::from(parts)).style(Theme::address_bar());
    frame.render_widget(paragraph, area);
}

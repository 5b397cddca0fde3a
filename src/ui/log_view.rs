use crate::app::state::{AppState, LineKind, LogLine};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{
    Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Log ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border())
        .style(Theme::panel());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let available_height = inner.height as usize;
    let total = state.log.len();

    // Compute visible range with scroll offset
    let end = total.saturating_sub(state.log_scroll);
    let start = end.saturating_sub(available_height);

    let lines: Vec<Line> = state.log[start..end].iter().map(format_line).collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    if total > available_height {
        let mut scrollbar_state =
            ScrollbarState::new(total.saturating_sub(available_height)).position(start);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("┃")
            .track_symbol(Some("│"))
            .thumb_style(Theme::border_focused())
            .track_style(Theme::border());
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

fn format_line<'a>(line: &LogLine) -> Line<'a> {
    let ts = Span::styled(format!("[{}] ", line.timestamp), Theme::timestamp());
    match line.kind {
        LineKind::System => Line::from(vec![
            ts,
            Span::styled("• ", Style::default().fg(Theme::ACCENT_AMBER)),
            Span::styled(line.text.clone(), Theme::system_message()),
        ]),
        LineKind::Navigation => Line::from(vec![
            ts,
            Span::styled("→ ", Style::default().fg(Theme::ACCENT_TEAL)),
            Span::styled(line.text.clone(), Theme::navigation_message()),
        ]),
        LineKind::Error => Line::from(vec![
            ts,
            Span::styled("✘ ", Style::default().fg(Theme::ACCENT_RED)),
            Span::styled(line.text.clone(), Theme::error_message()),
        ]),
    }
}

use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

pub fn render(frame: &mut Frame, state: &AppState) {
    let Some((message, close, action)) = state.alert.labels() else {
        return;
    };

    let area = frame.area();
    let popup_w = (area.width * 50 / 100).max(30).min(area.width.saturating_sub(4));
    let popup_h = 7.min(area.height.saturating_sub(2));
    let popup_x = area.width.saturating_sub(popup_w) / 2;
    let popup_y = area.height.saturating_sub(popup_h) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Alert ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Style::default().fg(Theme::ACCENT_AMBER))
        .style(Style::default().bg(Theme::BG_SURFACE));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if inner.height < 2 {
        return;
    }

    let message_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
    frame.render_widget(
        Paragraph::new(message)
            .style(Theme::text())
            .wrap(Wrap { trim: true }),
        message_area,
    );

    // Enter answers with the action button when there is one
    let mut buttons = Vec::new();
    if let Some(action) = action {
        buttons.push(Span::styled(
            format!("[Enter] {action}"),
            Style::default()
                .fg(Theme::ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        ));
        buttons.push(Span::raw("   "));
        buttons.push(Span::styled(format!("[Esc] {close}"), Theme::muted()));
    } else {
        buttons.push(Span::styled(
            format!("[Enter] {close}"),
            Style::default()
                .fg(Theme::ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let button_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
    frame.render_widget(
        Paragraph::new(Line::from(buttons)).alignment(Alignment::Right),
        button_area,
    );
}

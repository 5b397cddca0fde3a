use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::block::Padding;
use ratatui::widgets::{Block, Borders, Paragraph};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    // The alert owns the keyboard while it is open
    let focused = !state.alert.is_visible();

    let block = Block::default()
        .title(" Address / Command ")
        .title_style(if focused {
            Theme::title()
        } else {
            Theme::border()
        })
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .padding(Padding::horizontal(1))
        .style(Theme::panel());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled("❯ ", Style::default().fg(Theme::ACCENT_TEAL)),
        Span::styled(state.input.text.as_str(), Theme::text()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    if focused && inner.width > 0 {
        // Cursor offset: chevron "❯ " (2 columns)
        let prompt_offset = 2u16;
        let column = state.input.text[..state.input.cursor].chars().count() as u16;
        let cursor_x = inner.x + prompt_offset + column;
        frame.set_cursor_position((cursor_x.min(inner.right() - 1), inner.y));
    }
}

use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Store ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border())
        .style(Theme::panel());

    let snapshot = state.store.state();
    let items: Vec<ListItem> = if snapshot.is_empty() {
        vec![ListItem::new(Span::styled(" (empty)", Theme::muted()))]
    } else {
        snapshot
            .iter()
            .map(|(key, value)| {
                let watchers = state.store.watcher_count(key);
                let mut spans = vec![
                    Span::styled(format!(" {key}"), Theme::state_key()),
                    Span::styled(" = ", Theme::muted()),
                    Span::styled(value.to_string(), Theme::text()),
                ];
                if watchers > 0 {
                    spans.push(Span::styled(format!(" [{watchers}]"), Theme::muted()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    frame.render_widget(List::new(items).block(block), area);
}

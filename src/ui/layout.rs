use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub address_bar: Rect,
    pub mount_view: Rect,
    pub state_panel: Option<Rect>,
    pub log_view: Rect,
    pub input_box: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect, show_state: bool) -> AppLayout {
    // Main vertical split: address | content | input | status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Address bar
            Constraint::Min(6),    // Content
            Constraint::Length(3), // Input box
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let address_bar = main_chunks[0];
    let content = main_chunks[1];
    let input_box = main_chunks[2];
    let status_bar = main_chunks[3];

    // Horizontal: page | state panel
    let (page, state_panel) = if show_state {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .spacing(1)
            .constraints([Constraint::Min(30), Constraint::Length(30)])
            .split(content);
        (h_chunks[0], Some(h_chunks[1]))
    } else {
        (content, None)
    };

    // Page: mounted component | log
    let page_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Min(4)])
        .split(page);

    AppLayout {
        address_bar,
        mount_view: page_chunks[0],
        state_panel,
        log_view: page_chunks[1],
        input_box,
        status_bar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_panel_is_optional() {
        let area = Rect::new(0, 0, 100, 40);
        let hidden = compute_layout(area, false);
        assert!(hidden.state_panel.is_none());
        assert_eq!(hidden.mount_view.width, 100);

        let shown = compute_layout(area, true);
        let panel = shown.state_panel.unwrap();
        assert_eq!(panel.width, 30);
        assert!(shown.mount_view.width < 100);
        assert_eq!(shown.status_bar.y, 39);
    }
}

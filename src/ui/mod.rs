mod address_bar;
mod alert_popup;
mod input_box;
mod layout;
mod log_view;
mod mount_view;
mod state_panel;
mod status_bar;
mod theme;

use crate::app::state::AppState;
use ratatui::prelude::*;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area, state.config.ui.show_state);

    address_bar::render(frame, app_layout.address_bar, state);
    mount_view::render(frame, app_layout.mount_view, state);
    if let Some(panel) = app_layout.state_panel {
        state_panel::render(frame, panel, state);
    }
    log_view::render(frame, app_layout.log_view, state);
    input_box::render(frame, app_layout.input_box, state);
    status_bar::render(frame, app_layout.status_bar, state);

    // Overlay last so it draws on top
    alert_popup::render(frame, state);
}

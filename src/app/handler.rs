use crate::app::action::Action;
use crate::app::commands::{self, ParsedCommand};
use crate::app::event::AppEvent;
use crate::app::state::AppState;
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::Tick => {
            handle_tick(state);
            vec![]
        }
    }
}

fn handle_tick(state: &mut AppState) {
    state.tick_count = state.tick_count.wrapping_add(1);
    if state
        .status_expires
        .is_some_and(|expires| state.tick_count >= expires)
    {
        state.status_message = None;
        state.status_expires = None;
        state.dirty = true;
    }
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) if key.kind != KeyEventKind::Release => handle_key(state, key),
        CEvent::Resize(_, _) => {
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    // Global keybindings
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }

    // The alert captures all input while visible
    if state.alert.is_visible() {
        return match key.code {
            KeyCode::Enter => vec![Action::AnswerAlert { confirmed: true }],
            KeyCode::Esc => vec![Action::AnswerAlert { confirmed: false }],
            _ => vec![],
        };
    }

    if key.modifiers.contains(KeyModifiers::ALT) {
        match key.code {
            KeyCode::Left => return vec![Action::Back],
            KeyCode::Right => return vec![Action::Forward],
            _ => {}
        }
    }

    match key.code {
        KeyCode::F(5) => return vec![Action::Reload],
        KeyCode::F(2) => {
            state.show_markup = !state.show_markup;
            return vec![];
        }
        _ => {}
    }

    handle_input_key(state, key)
}

fn handle_input_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Enter => {
            let text = state.input.take_text();
            let text = text.trim();
            if text.is_empty() {
                return vec![];
            }
            if text.starts_with('/') {
                return handle_command(state, text);
            }
            // Plain input is an address: route[?query]
            let (route, query) = commands::split_address(text);
            vec![Action::Navigate { route, query }]
        }
        KeyCode::Backspace => {
            if key.modifiers.contains(KeyModifiers::ALT) {
                state.input.delete_word_back();
            } else {
                state.input.delete_back();
            }
            vec![]
        }
        KeyCode::Delete => {
            state.input.delete_forward();
            vec![]
        }
        KeyCode::Left => {
            state.input.move_left();
            vec![]
        }
        KeyCode::Right => {
            state.input.move_right();
            vec![]
        }
        KeyCode::Home => {
            state.input.move_home();
            vec![]
        }
        KeyCode::End => {
            state.input.move_end();
            vec![]
        }
        KeyCode::Up => {
            state.input.history_up();
            vec![]
        }
        KeyCode::Down => {
            state.input.history_down();
            vec![]
        }
        KeyCode::Tab => {
            try_completion(state);
            vec![]
        }
        KeyCode::PageUp => {
            state.scroll_log_up();
            vec![]
        }
        KeyCode::PageDown => {
            state.scroll_log_down();
            vec![]
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'a' => state.input.move_home(),
                    'e' => state.input.move_end(),
                    'w' => state.input.delete_word_back(),
                    'u' => state.input.clear(),
                    _ => {}
                }
            } else {
                state.input.insert_char(c);
            }
            vec![]
        }
        _ => vec![],
    }
}

/// Completes command names, and route keys after `/to` or in a bare address.
fn try_completion(state: &mut AppState) {
    let text = state.input.text.clone();

    if let Some(body) = text.strip_prefix('/') {
        let parts: Vec<&str> = body.splitn(2, ' ').collect();
        let cmd = parts.first().copied().unwrap_or("").to_lowercase();

        if parts.len() == 1 {
            if let Some(first) = commands::COMMANDS.iter().find(|c| c.starts_with(cmd.as_str())) {
                state.input.text = format!("/{first} ");
                state.input.cursor = state.input.text.len();
            }
            return;
        }

        if matches!(cmd.as_str(), "to" | "go" | "preload") {
            let partial = parts.get(1).copied().unwrap_or("");
            if !partial.contains(' ') {
                if let Some(route) = complete_route(state, partial) {
                    state.input.text = format!("/{cmd} {route}");
                    state.input.cursor = state.input.text.len();
                }
            }
        }
        return;
    }

    if !text.contains(['?', ' ']) {
        if let Some(route) = complete_route(state, &text) {
            state.input.text = route;
            state.input.cursor = state.input.text.len();
        }
    }
}

fn complete_route(state: &AppState, partial: &str) -> Option<String> {
    let partial = partial.to_lowercase();
    state
        .config
        .routes
        .keys()
        .find(|key| key.to_lowercase().starts_with(&partial))
        .cloned()
}

fn handle_command(state: &mut AppState, text: &str) -> Vec<Action> {
    match commands::parse_command(text) {
        Some(ParsedCommand::To { route, query }) => vec![Action::Navigate { route, query }],
        Some(ParsedCommand::Home) => vec![Action::Home],
        Some(ParsedCommand::Back) => vec![Action::Back],
        Some(ParsedCommand::Forward) => vec![Action::Forward],
        Some(ParsedCommand::Reload) => vec![Action::Reload],
        Some(ParsedCommand::Restrict) => vec![Action::Restrict],
        Some(ParsedCommand::Preload { names }) => vec![Action::Preload { names }],
        Some(ParsedCommand::Set { key, value }) => vec![Action::SetState { key, value }],
        Some(ParsedCommand::Unset { key }) => vec![Action::UnsetState { key }],
        Some(ParsedCommand::State) => {
            let snapshot = state.store.state();
            if snapshot.is_empty() {
                state.system_message("Store is empty.");
            }
            for (key, value) in snapshot {
                state.system_message(format!("  {key} = {value}"));
            }
            vec![]
        }
        Some(ParsedCommand::Help) => {
            for line in commands::help_lines() {
                state.system_message(*line);
            }
            vec![]
        }
        Some(ParsedCommand::Quit) => vec![Action::Quit],
        None => {
            state.error_message(format!("Unknown command or missing argument: {text}"));
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::ShellAlert;
    use crate::config::AppConfig;
    use crossterm::event::KeyEventState;
    use naive::alert::{Alert, AlertButton};
    use naive::dom::Node;
    use naive::store::Store;
    use std::rc::Rc;

    fn state() -> AppState {
        AppState::new(
            AppConfig::default(),
            Node::element("div"),
            Rc::new(Store::new()),
            Rc::new(ShellAlert::default()),
        )
    }

    fn press(state: &mut AppState, code: KeyCode) -> Vec<Action> {
        let key = KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_event(state, AppEvent::Terminal(CEvent::Key(key)))
    }

    fn type_line(state: &mut AppState, line: &str) -> Vec<Action> {
        for c in line.chars() {
            press(state, KeyCode::Char(c));
        }
        press(state, KeyCode::Enter)
    }

    #[test]
    fn plain_input_navigates() {
        let mut state = state();
        assert_eq!(
            type_line(&mut state, "about?tab=1"),
            vec![Action::Navigate {
                route: "about".into(),
                query: Some("tab=1".into())
            }]
        );
    }

    #[test]
    fn alert_captures_keys() {
        let mut state = state();
        state.alert.display("Delete?", AlertButton::close(), Some(AlertButton::new("Yes")));
        assert!(press(&mut state, KeyCode::Char('x')).is_empty());
        assert_eq!(
            press(&mut state, KeyCode::Esc),
            vec![Action::AnswerAlert { confirmed: false }]
        );
        assert!(state.input.text.is_empty());
    }

    #[test]
    fn tab_completes_routes() {
        let mut state = state();
        for c in "/to ab".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.input.text, "/to about");
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut state = state();
        assert!(type_line(&mut state, "/dance").is_empty());
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn status_flash_expires() {
        let mut state = state();
        state.flash("Preloaded");
        for _ in 0..60 {
            handle_event(&mut state, AppEvent::Tick);
        }
        assert!(state.status_message.is_none());
    }
}

use crate::config::AppConfig;
use chrono::Local;
use naive::alert::{Alert, AlertButton};
use naive::dom::Node;
use naive::store::Store;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: String,
    pub text: String,
    pub kind: LineKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind {
    System,
    Navigation,
    Error,
}

/// The address/command line. `cursor` is a byte offset that always sits on
/// a char boundary.
#[derive(Debug, Default)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
    pub history: Vec<String>,
    pub history_index: Option<usize>,
}

/// Where Ctrl+W / Alt+Backspace stop inside an address like `a?x=1&y=2`.
const WORD_SEPARATORS: &[char] = &[' ', '/', '?', '&', '='];

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .chars()
            .next_back()
            .map_or(0, |c| self.cursor - c.len_utf8())
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        let start = self.prev_boundary();
        self.text.drain(start..self.cursor);
        self.cursor = start;
    }

    pub fn delete_forward(&mut self) {
        let end = self.next_boundary();
        self.text.drain(self.cursor..end);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Empties the line and remembers it, skipping a repeat of the last
    /// remembered line.
    pub fn take_text(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history_index = None;
        if !text.is_empty() && self.history.last() != Some(&text) {
            self.history.push(text.clone());
        }
        text
    }

    pub fn history_up(&mut self) {
        let index = match self.history_index {
            None => self.history.len().checked_sub(1),
            Some(i) => Some(i.saturating_sub(1)),
        };
        if let Some(index) = index {
            self.history_index = Some(index);
            self.set_text(self.history[index].clone());
        }
    }

    pub fn history_down(&mut self) {
        let Some(i) = self.history_index else {
            return;
        };
        if i + 1 < self.history.len() {
            self.history_index = Some(i + 1);
            self.set_text(self.history[i + 1].clone());
        } else {
            self.history_index = None;
            self.clear();
        }
    }

    /// Deletes back to the previous address separator or space.
    pub fn delete_word_back(&mut self) {
        let head = &self.text[..self.cursor];
        let start = head
            .trim_end_matches(WORD_SEPARATORS)
            .rfind(WORD_SEPARATORS)
            .map_or(0, |i| i + 1);
        self.text.drain(start..self.cursor);
        self.cursor = start;
    }
}

pub struct AlertView {
    pub message: String,
    pub close: AlertButton,
    pub action: Option<AlertButton>,
}

/// On-screen alert: components fill it, the popup renders it, the user
/// answers it with Enter or Esc.
#[derive(Default)]
pub struct ShellAlert {
    current: RefCell<Option<AlertView>>,
}

impl ShellAlert {
    pub fn is_visible(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn take(&self) -> Option<AlertView> {
        self.current.borrow_mut().take()
    }

    /// Message and button labels for rendering.
    pub fn labels(&self) -> Option<(String, String, Option<String>)> {
        self.current.borrow().as_ref().map(|view| {
            (
                view.message.clone(),
                view.close.text.clone(),
                view.action.as_ref().map(|a| a.text.clone()),
            )
        })
    }
}

impl Alert for ShellAlert {
    fn reset(&self) {
        self.current.borrow_mut().take();
    }

    fn display(&self, message: &str, close: AlertButton, action: Option<AlertButton>) {
        *self.current.borrow_mut() = Some(AlertView {
            message: message.to_string(),
            close,
            action,
        });
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub input: InputState,
    pub log: Vec<LogLine>,
    pub log_scroll: usize,
    pub mount: Node,
    pub store: Rc<Store>,
    pub alert: Rc<ShellAlert>,
    pub location: String,
    pub component: Option<String>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub show_markup: bool,
    pub should_quit: bool,
    pub dirty: bool,
    pub status_message: Option<String>,
    pub status_expires: Option<u64>,
    pub tick_count: u64,
    pub timestamp_format: String,
}

impl AppState {
    pub fn new(config: AppConfig, mount: Node, store: Rc<Store>, alert: Rc<ShellAlert>) -> Self {
        let timestamp_format = config.ui.timestamp_format.clone();
        Self {
            config,
            input: InputState::new(),
            log: Vec::new(),
            log_scroll: 0,
            mount,
            store,
            alert,
            location: String::new(),
            component: None,
            can_go_back: false,
            can_go_forward: false,
            show_markup: false,
            should_quit: false,
            dirty: true,
            status_message: None,
            status_expires: None,
            tick_count: 0,
            timestamp_format,
        }
    }

    fn push_line(&mut self, text: String, kind: LineKind) {
        self.log.push(LogLine {
            timestamp: Local::now().format(&self.timestamp_format).to_string(),
            text,
            kind,
        });
        let max = self.config.ui.max_log_lines.max(1);
        if self.log.len() > max {
            let excess = self.log.len() - max;
            self.log.drain(..excess);
        }
        self.dirty = true;
    }

    pub fn system_message(&mut self, text: impl Into<String>) {
        self.push_line(text.into(), LineKind::System);
    }

    pub fn navigation_message(&mut self, text: impl Into<String>) {
        self.push_line(text.into(), LineKind::Navigation);
    }

    pub fn error_message(&mut self, text: impl Into<String>) {
        self.push_line(text.into(), LineKind::Error);
    }

    /// Shows `text` in the status bar for about three seconds.
    pub fn flash(&mut self, text: impl Into<String>) {
        self.status_message = Some(text.into());
        self.status_expires = Some(self.tick_count + 60);
        self.dirty = true;
    }

    pub fn status_line(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }
        let keys = self.store.state().len();
        match &self.component {
            Some(name) => format!("Mounted: {name} | Store keys: {keys}"),
            None => format!("Nothing mounted | Store keys: {keys}"),
        }
    }

    pub fn scroll_log_up(&mut self) {
        self.log_scroll = (self.log_scroll + 5).min(self.log.len().saturating_sub(1));
        self.dirty = true;
    }

    pub fn scroll_log_down(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(5);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_editing_handles_multibyte() {
        let mut input = InputState::new();
        for c in "héllo".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.move_left();
        input.move_left();
        input.delete_back();
        assert_eq!(input.text, "hllo");
        input.move_end();
        input.delete_word_back();
        assert!(input.text.is_empty());
    }

    #[test]
    fn history_recall() {
        let mut input = InputState::new();
        input.text = "/to about".into();
        input.take_text();
        input.text = "/home".into();
        input.take_text();
        input.history_up();
        assert_eq!(input.text, "/home");
        input.history_up();
        assert_eq!(input.text, "/to about");
        input.history_down();
        input.history_down();
        assert!(input.text.is_empty());
    }

    #[test]
    fn repeated_lines_are_remembered_once() {
        let mut input = InputState::new();
        for _ in 0..2 {
            input.text = "/reload".into();
            input.take_text();
        }
        assert_eq!(input.history, vec!["/reload".to_string()]);
    }

    #[test]
    fn word_delete_stops_at_address_separators() {
        let mut input = InputState::new();
        for c in "/to about?tab=team".chars() {
            input.insert_char(c);
        }
        input.delete_word_back();
        assert_eq!(input.text, "/to about?tab=");
        input.delete_word_back();
        assert_eq!(input.text, "/to about?");
        input.delete_word_back();
        assert_eq!(input.text, "/to ");
    }

    #[test]
    fn log_is_capped() {
        let mut config = AppConfig::default();
        config.ui.max_log_lines = 3;
        let mut state = AppState::new(
            config,
            Node::element("div"),
            Rc::new(Store::new()),
            Rc::new(ShellAlert::default()),
        );
        for i in 0..5 {
            state.system_message(format!("line {i}"));
        }
        assert_eq!(state.log.len(), 3);
        assert_eq!(state.log[0].text, "line 2");
    }

    #[test]
    fn alert_reset_hides_it() {
        let alert = ShellAlert::default();
        alert.display("Saved", AlertButton::close(), None);
        assert_eq!(alert.labels().unwrap().1, "Ok");
        alert.reset();
        assert!(!alert.is_visible());
    }
}

use serde_json::Value;

/// Work the main loop performs against the router and store.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate { route: String, query: Option<String> },
    Home,
    Back,
    Forward,
    Reload,
    Restrict,
    Preload { names: Vec<String> },
    SetState { key: String, value: Value },
    UnsetState { key: String },
    /// Answer the visible alert: `true` presses its action button.
    AnswerAlert { confirmed: bool },
    Quit,
}

//! User slash-command parser.
//!
//! Parses `/command arg1 arg2 ...` input lines into typed [`ParsedCommand`]
//! values that the event handler can act on.

use serde_json::Value;

/// A parsed user command. Each variant corresponds to a `/command`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    To { route: String, query: Option<String> },
    Home,
    Back,
    Forward,
    Reload,
    Restrict,
    Preload { names: Vec<String> },
    Set { key: String, value: Value },
    Unset { key: String },
    State,
    Help,
    Quit,
}

pub const COMMANDS: &[&str] = &[
    "to", "home", "back", "forward", "reload", "restrict", "preload", "set", "unset", "state",
    "help", "quit", "exit",
];

/// Parse a slash-command string into a [`ParsedCommand`].
///
/// Returns `None` if the input does not start with `/`, is not a recognized
/// command or lacks a required argument. Commands are case-insensitive.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    let body = input.strip_prefix('/')?;

    let parts: Vec<&str> = body.splitn(3, ' ').collect();
    let cmd = parts.first()?.to_lowercase();
    let arg = |i: usize| parts.get(i).map(|s| s.trim()).filter(|s| !s.is_empty());

    match cmd.as_str() {
        "to" | "go" => {
            let (route, query) = split_address(arg(1)?);
            let query = arg(2).map(str::to_string).or(query);
            Some(ParsedCommand::To { route, query })
        }
        "home" => Some(ParsedCommand::Home),
        "back" => Some(ParsedCommand::Back),
        "forward" | "fwd" => Some(ParsedCommand::Forward),
        "reload" => Some(ParsedCommand::Reload),
        "restrict" | "logout" => Some(ParsedCommand::Restrict),
        "preload" => {
            let names: Vec<String> = body
                .split_whitespace()
                .skip(1)
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                None
            } else {
                Some(ParsedCommand::Preload { names })
            }
        }
        "set" => {
            let key = arg(1)?.to_string();
            let raw = arg(2)?;
            // Anything that is not JSON is taken as a bare string.
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            Some(ParsedCommand::Set { key, value })
        }
        "unset" => Some(ParsedCommand::Unset {
            key: arg(1)?.to_string(),
        }),
        "state" => Some(ParsedCommand::State),
        "help" => Some(ParsedCommand::Help),
        "quit" | "exit" => Some(ParsedCommand::Quit),
        _ => None,
    }
}

/// Splits `route?query` as typed into the address line. A leading `/` is
/// optional.
pub fn split_address(address: &str) -> (String, Option<String>) {
    let address = address.trim().trim_start_matches('/');
    match address.split_once('?') {
        Some((route, query)) => (
            route.to_string(),
            Some(query.to_string()).filter(|q| !q.is_empty()),
        ),
        None => (address.to_string(), None),
    }
}

pub fn help_lines() -> &'static [&'static str] {
    &[
        "/to <route> [query]   navigate (also: type route?query and press Enter)",
        "/home                 go to the home route",
        "/back, /forward       move through history (Alt+Left / Alt+Right)",
        "/reload               reload the current entry (F5)",
        "/restrict             drop restricted components",
        "/preload <names..>    fetch definitions ahead of time",
        "/set <key> <json>     write to the store",
        "/unset <key>          remove a store key",
        "/state                print the store",
        "/quit                 exit (Ctrl+C)",
        "F2 toggles the markup view, PageUp/PageDown scroll the log",
    ]
}

//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the shell works out of the box:
//! with no config file it serves a few demo components from memory.

use naive::doorman::{RouteEntry, Settings};
use naive::registry::ComponentPayload;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default = "default_router")]
    pub router: Settings,
    #[serde(default = "default_routes")]
    pub routes: BTreeMap<String, RouteEntry>,
    /// Definitions served by the `memory` loader.
    #[serde(default = "default_components")]
    pub components: BTreeMap<String, ComponentPayload>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default = "default_ui")]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            loader: LoaderConfig::default(),
            router: default_router(),
            routes: default_routes(),
            components: default_components(),
            store: StoreConfig::default(),
            ui: default_ui(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// `id` of the mount node.
    #[serde(default = "default_mount")]
    pub mount: String,
    /// Location the session history starts at.
    #[serde(default = "default_start_url")]
    pub start_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mount: default_mount(),
            start_url: default_start_url(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    #[default]
    Memory,
    Http,
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub kind: LoaderKind,
    /// Required for the `http` loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_component_dir")]
    pub directory: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            kind: LoaderKind::Memory,
            endpoint: None,
            directory: default_component_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_initial_state")]
    pub initial: Map<String, Value>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial: default_initial_state(),
        }
    }
}

/// Display preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_max_log_lines")]
    pub max_log_lines: usize,
    #[serde(default = "default_true")]
    pub show_state: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_mount() -> String {
    "naive-main".to_string()
}
fn default_start_url() -> String {
    "http://localhost/".to_string()
}
fn default_component_dir() -> String {
    "~/.config/naive/components".to_string()
}
fn default_timestamp_format() -> String {
    "%H:%M:%S".to_string()
}
fn default_max_log_lines() -> usize {
    500
}
fn default_log_dir() -> String {
    "~/.local/share/naive/logs".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_ui() -> UiConfig {
    UiConfig {
        timestamp_format: default_timestamp_format(),
        max_log_lines: default_max_log_lines(),
        show_state: true,
    }
}
fn default_router() -> Settings {
    Settings {
        default: Some("home".to_string()),
        home: Some("home".to_string()),
    }
}
fn default_routes() -> BTreeMap<String, RouteEntry> {
    ["home", "about", "account"]
        .into_iter()
        .map(|key| (key.to_string(), RouteEntry::new(key)))
        .collect()
}
fn default_components() -> BTreeMap<String, ComponentPayload> {
    let home = ComponentPayload::new(
        "home",
        r#"<main name="home">
             <h1>Welcome</h1>
             <p>Signed in as <b data-bind="user"></b>, theme <i data-bind="theme"></i>.</p>
             <nav><a href="/about">about</a> <a href="/account">account</a></nav>
           </main>"#,
        "bind",
    );
    let about = ComponentPayload::new(
        "about",
        r#"<main name="about">
             <h1>About</h1>
             <p>Components are fetched on demand and mounted one at a time.</p>
           </main>"#,
        "static",
    );
    let account = ComponentPayload::new(
        "account",
        r#"<main name="account">
             <h1>Account</h1>
             <p>User: <b data-bind="user"></b></p>
             <p>Visits: <b data-bind="visits"></b></p>
           </main>"#,
        "bind",
    )
    .restricted(true);
    [home, about, account]
        .into_iter()
        .filter_map(|payload| Some((payload.name.clone()?, payload)))
        .collect()
}
fn default_initial_state() -> Map<String, Value> {
    let mut state = Map::new();
    state.insert("user".into(), Value::from("guest"));
    state.insert("theme".into(), Value::from("dark"));
    state.insert("visits".into(), Value::from(0));
    state
}

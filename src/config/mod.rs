pub mod model;

use anyhow::{Context, Result};
use naive::doorman::RouteTable;
use naive::registry::{ComponentLoader, DirectoryLoader, HttpLoader, MemoryLoader};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use url::Url;

pub use model::{AppConfig, LoaderKind, LoggingConfig};

fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("NAIVE_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("naive")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config file")?;
    Ok(config)
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix('~')) {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

impl AppConfig {
    pub fn route_table(&self) -> RouteTable {
        self.routes
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    pub fn build_loader(&self) -> Result<Rc<dyn ComponentLoader>> {
        let loader: Rc<dyn ComponentLoader> = match self.loader.kind {
            LoaderKind::Memory => Rc::new(
                self.components
                    .iter()
                    .map(|(key, payload)| (key.clone(), payload.clone()))
                    .collect::<MemoryLoader>(),
            ),
            LoaderKind::Http => {
                let endpoint = self
                    .loader
                    .endpoint
                    .as_deref()
                    .context("loader.endpoint is required for the http loader")?;
                let url = Url::parse(endpoint)
                    .with_context(|| format!("Invalid loader endpoint '{endpoint}'"))?;
                Rc::new(HttpLoader::new(url))
            }
            LoaderKind::Directory => {
                Rc::new(DirectoryLoader::new(expand_home(&self.loader.directory)))
            }
        };
        Ok(loader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_working_demo() {
        let config = AppConfig::default();
        let routes = config.route_table();
        assert!(routes.contains("home"));
        assert_eq!(config.router.home.as_deref(), Some("home"));
        for key in routes.keys() {
            let comp = routes.get(key).and_then(|e| e.comp.clone()).unwrap();
            assert!(config.components.contains_key(&comp), "{comp} has no definition");
        }
        assert!(config.build_loader().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [loader]
            kind = "http"
            endpoint = "https://example.test/component"

            [routes.docs]
            comp = "docs"
            query = "page=1"

            [store.initial]
            user = "ada"
            "#,
        )
        .unwrap();
        assert_eq!(config.loader.kind, LoaderKind::Http);
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes["docs"].query.as_deref(), Some("page=1"));
        assert_eq!(config.store.initial["user"], "ada");
        assert_eq!(config.router.home.as_deref(), Some("home"));
        assert!(!config.logging.enabled);
    }

    #[test]
    fn http_loader_needs_an_endpoint() {
        let mut config = AppConfig::default();
        config.loader.kind = LoaderKind::Http;
        assert!(config.build_loader().is_err());
        config.loader.endpoint = Some("not a url".into());
        assert!(config.build_loader().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_from(Path::new("/nonexistent/naive/config.toml")).unwrap();
        assert_eq!(config.runtime.mount, "naive-main");
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/logs"), home.join("logs"));
        }
        assert_eq!(expand_home("/var/log"), PathBuf::from("/var/log"));
    }
}

//! Where component definitions come from.
//!
//! Wire format for the HTTP loader:
//! request `{"name": "<name>"}`, response
//! `{"info": {"component": {"name", "template", "script", "restricted"?}}}`.

use crate::error::LoadFailure;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// A definition as the source delivered it. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted: Option<bool>,
}

impl ComponentPayload {
    pub fn new(name: &str, template: &str, script: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            template: Some(template.to_string()),
            script: Some(script.to_string()),
            restricted: None,
        }
    }

    pub fn restricted(mut self, restricted: bool) -> Self {
        self.restricted = Some(restricted);
        self
    }
}

#[derive(Debug, Serialize)]
struct LoaderRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoaderResponse {
    info: LoaderInfo,
}

#[derive(Debug, Deserialize)]
struct LoaderInfo {
    component: ComponentPayload,
}

pub trait ComponentLoader {
    fn fetch<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<ComponentPayload, LoadFailure>>;
}

/// POSTs `{"name": ..}` as JSON to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpLoader {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ComponentLoader for HttpLoader {
    fn fetch<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<ComponentPayload, LoadFailure>> {
        async move {
            debug!(endpoint = %self.endpoint, name, "requesting component");
            let response = self
                .client
                .post(self.endpoint.clone())
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&LoaderRequest { name })
                .send()
                .await
                .map_err(|e| LoadFailure::Connection(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadFailure::Status(status.as_u16()));
            }

            let body: LoaderResponse = response
                .json()
                .await
                .map_err(|e| LoadFailure::Malformed(e.to_string()))?;
            Ok(body.info.component)
        }
        .boxed_local()
    }
}

/// Reads `<dir>/<name>.toml` manifests.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Component names become file names; anything that could climb out of the
/// directory is refused.
fn manifest_path(dir: &Path, name: &str) -> Option<PathBuf> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !name.contains("..");
    valid.then(|| dir.join(format!("{name}.toml")))
}

impl ComponentLoader for DirectoryLoader {
    fn fetch<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<ComponentPayload, LoadFailure>> {
        async move {
            let path = manifest_path(&self.dir, name)
                .ok_or_else(|| LoadFailure::Malformed(format!("invalid component name '{name}'")))?;
            debug!(path = %path.display(), "reading component manifest");
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| LoadFailure::Connection(format!("{}: {e}", path.display())))?;
            toml::from_str(&raw).map_err(|e| LoadFailure::Malformed(e.to_string()))
        }
        .boxed_local()
    }
}

/// Serves payloads from memory, e.g. the `[components]` config table.
/// Counts fetches.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    components: HashMap<String, ComponentPayload>,
    fetches: Cell<usize>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, payload: ComponentPayload) -> Self {
        self.components.insert(key.to_string(), payload);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl<K: Into<String>> FromIterator<(K, ComponentPayload)> for MemoryLoader {
    fn from_iter<I: IntoIterator<Item = (K, ComponentPayload)>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            fetches: Cell::new(0),
        }
    }
}

impl ComponentLoader for MemoryLoader {
    fn fetch<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<ComponentPayload, LoadFailure>> {
        self.fetches.set(self.fetches.get() + 1);
        let result = self
            .components
            .get(name)
            .cloned()
            .ok_or_else(|| LoadFailure::Connection(format!("no component named '{name}'")));
        futures::future::ready(result).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_body_parses() {
        let body = r#"{"info":{"component":{"name":"about","template":"<div name=\"about\"></div>","script":"static","restricted":true}}}"#;
        let parsed: LoaderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.info.component.name.as_deref(), Some("about"));
        assert_eq!(parsed.info.component.restricted, Some(true));
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_string(&LoaderRequest { name: "home" }).unwrap();
        assert_eq!(body, r#"{"name":"home"}"#);
    }

    #[test]
    fn manifest_names_are_sanitized() {
        let dir = Path::new("/srv/components");
        assert_eq!(manifest_path(dir, "home"), Some(dir.join("home.toml")));
        assert!(manifest_path(dir, "../etc/passwd").is_none());
        assert!(manifest_path(dir, "a/b").is_none());
        assert!(manifest_path(dir, ".hidden").is_none());
        assert!(manifest_path(dir, "").is_none());
    }

    #[tokio::test]
    async fn directory_loader_reads_manifests() {
        let dir = std::env::temp_dir().join(format!("naive-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("card.toml"),
            "name = \"card\"\ntemplate = \"<div name='card'></div>\"\nscript = \"static\"\n",
        )
        .unwrap();

        let loader = DirectoryLoader::new(&dir);
        let payload = loader.fetch("card").await.unwrap();
        assert_eq!(payload.script.as_deref(), Some("static"));
        assert!(matches!(
            loader.fetch("missing").await,
            Err(LoadFailure::Connection(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn memory_loader_counts_fetches() {
        let loader = MemoryLoader::new().with("a", ComponentPayload::new("a", "<p></p>", "static"));
        assert!(loader.fetch("a").await.is_ok());
        assert!(loader.fetch("b").await.is_err());
        assert_eq!(loader.fetches(), 2);
    }
}

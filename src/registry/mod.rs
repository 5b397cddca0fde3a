//! Fetch-on-demand component definitions with a process-wide cache.

pub mod loader;

pub use loader::{ComponentLoader, ComponentPayload, DirectoryLoader, HttpLoader, MemoryLoader};

use crate::error::{Error, LoadFailure, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info};

/// A valid definition: both template and script present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    pub name: String,
    pub template: String,
    pub script: String,
    pub restricted: bool,
}

impl ComponentDefinition {
    fn from_payload(requested: &str, payload: &ComponentPayload) -> Option<Self> {
        Some(Self {
            name: payload.name.clone().unwrap_or_else(|| requested.to_string()),
            template: payload.template.clone()?,
            script: payload.script.clone()?,
            restricted: payload.restricted.unwrap_or(false),
        })
    }

    /// Whether `payload` carries a value that differs from this entry.
    fn differs_from(&self, payload: &ComponentPayload) -> bool {
        payload.template.as_ref().is_some_and(|t| *t != self.template)
            || payload.script.as_ref().is_some_and(|s| *s != self.script)
            || payload.restricted.is_some_and(|r| r != self.restricted)
    }
}

pub struct ComponentRegistry {
    loader: Rc<dyn ComponentLoader>,
    cache: RefCell<HashMap<String, Rc<ComponentDefinition>>>,
}

impl ComponentRegistry {
    pub fn new(loader: Rc<dyn ComponentLoader>) -> Self {
        Self {
            loader,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the cached definition or fetches it.
    pub async fn get(&self, name: &str) -> Result<ComponentDefinition> {
        if let Some(hit) = self.cached(name) {
            debug!(name, "component cache hit");
            return Ok((*hit).clone());
        }

        debug!(name, "fetching component");
        let payload = self
            .loader
            .fetch(name)
            .await
            .map_err(|reason| Error::ComponentLoad {
                name: name.to_string(),
                reason,
            })?;

        let definition =
            ComponentDefinition::from_payload(name, &payload).ok_or_else(|| Error::ComponentLoad {
                name: name.to_string(),
                reason: LoadFailure::Incomplete,
            })?;

        if payload.name.as_deref() == Some(name) {
            self.memoize(name, &payload, &definition);
        } else {
            debug!(
                requested = name,
                delivered = payload.name.as_deref().unwrap_or(""),
                "name mismatch, not caching"
            );
        }
        Ok(definition)
    }

    fn memoize(&self, name: &str, payload: &ComponentPayload, definition: &ComponentDefinition) {
        let mut cache = self.cache.borrow_mut();
        let stale = cache.get(name).is_none_or(|entry| entry.differs_from(payload));
        if stale {
            cache.insert(name.to_string(), Rc::new(definition.clone()));
        }
    }

    /// Evicts every restricted definition.
    pub fn restrict(&self) {
        let mut cache = self.cache.borrow_mut();
        let before = cache.len();
        cache.retain(|_, entry| !entry.restricted);
        info!(evicted = before - cache.len(), "restricted components evicted");
    }

    pub fn cached(&self, name: &str) -> Option<Rc<ComponentDefinition>> {
        self.cache.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

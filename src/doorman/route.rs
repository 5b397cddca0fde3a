use crate::component::{EventMap, Lifecycle};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What a route key maps to. `on` and `life` can only be set from code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(default)]
    pub comp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip)]
    pub on: EventMap,
    #[serde(skip)]
    pub life: Lifecycle,
}

impl RouteEntry {
    pub fn new(comp: &str) -> Self {
        Self {
            comp: Some(comp.to_string()),
            ..Default::default()
        }
    }

    pub fn with_opt(mut self, opt: Value) -> Self {
        self.opt = Some(opt);
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_events(mut self, on: EventMap) -> Self {
        self.on = on;
        self
    }

    pub fn with_life(mut self, life: Lifecycle) -> Self {
        self.life = life;
        self
    }
}

/// Route key → entry. Immutable once handed to a doorman.
#[derive(Debug, Clone, Default)]
pub struct RouteTable(BTreeMap<String, RouteEntry>);

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, key: &str, entry: RouteEntry) -> Self {
        self.0.insert(key.to_string(), entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RouteEntry> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self
            .0
            .iter()
            .find(|(_, entry)| entry.comp.as_deref().is_none_or(str::is_empty))
        {
            Some((route, _)) => Err(Error::InvalidRouteTable {
                route: route.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, RouteEntry)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (K, RouteEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Route used when a request names none or an unknown one.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
}

/// The `where` of a navigation. Fields left `None` fall back to the route
/// entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteRequest {
    pub route: Option<String>,
    pub query: Option<String>,
    pub hash: Option<String>,
    pub opt: Option<Value>,
}

impl RouteRequest {
    pub fn route(key: &str) -> Self {
        Self {
            route: Some(key.to_string()),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_hash(mut self, hash: &str) -> Self {
        self.hash = Some(hash.to_string());
        self
    }

    pub fn with_opt(mut self, opt: Value) -> Self {
        self.opt = Some(opt);
        self
    }
}

impl From<&str> for RouteRequest {
    fn from(key: &str) -> Self {
        Self::route(key)
    }
}

impl From<String> for RouteRequest {
    fn from(key: String) -> Self {
        Self {
            route: Some(key),
            ..Default::default()
        }
    }
}

impl From<Option<&str>> for RouteRequest {
    fn from(key: Option<&str>) -> Self {
        key.map(Self::route).unwrap_or_default()
    }
}

/// A route entry overlaid with the request that selected it.
#[derive(Debug, Clone)]
pub(crate) struct RouteDescriptor {
    pub route: String,
    pub comp: String,
    pub opt: Option<Value>,
    pub query: Option<String>,
    pub hash: Option<String>,
    pub on: EventMap,
    pub life: Lifecycle,
}

impl RouteDescriptor {
    pub fn new(route: String, entry: &RouteEntry, request: RouteRequest) -> Self {
        Self {
            route,
            comp: entry.comp.clone().unwrap_or_default(),
            opt: request.opt.or_else(|| entry.opt.clone()),
            query: request.query.or_else(|| entry.query.clone()),
            hash: request.hash.or_else(|| entry.hash.clone()),
            on: entry.on.clone(),
            life: entry.life.clone(),
        }
    }
}

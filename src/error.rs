//! Error types shared by the runtime.
//!
//! Constructors fail fast with validation errors. Everything that happens
//! after a navigation starts surfaces as a rejected `load`/`to`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("some routes don't specify a component name in 'comp' (route '{route}')")]
    InvalidRouteTable { route: String },

    #[error("router could not be created, settings.home not defined")]
    MissingHome,

    #[error("no route specified")]
    NoRoute,

    #[error("could not load component. Request : {{ name: {name} }}")]
    ComponentLoad {
        name: String,
        #[source]
        reason: LoadFailure,
    },

    #[error("component '{name}' has an empty template")]
    EmptyTemplate { name: String },

    #[error("component '{name}' refers to unknown script '{script}'")]
    UnknownScript { name: String, script: String },

    #[error("emitter {0} not defined")]
    UndeclaredEvent(String),

    #[error("component error: {0}")]
    Component(String),

    #[error("load of route '{route}' superseded by a newer navigation")]
    Superseded { route: String },

    #[error("router is not available")]
    RouterUnavailable,

    #[error("global state initialisation error : global state has already been mutated")]
    AlreadyInitialised,

    #[error("invalid watcher: {0}")]
    InvalidWatcher(String),

    #[error("state key '{0}' is read-only")]
    ReadOnlyKey(String),
}

impl Error {
    /// Shorthand for component code reporting its own failures.
    pub fn component(message: impl Into<String>) -> Self {
        Error::Component(message.into())
    }
}

/// Why a component loader could not produce a payload.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("connection problem: {0}")]
    Connection(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed component payload: {0}")]
    Malformed(String),
    #[error("payload is missing 'template' or 'script'")]
    Incomplete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_names_the_component() {
        let err = Error::ComponentLoad {
            name: "about".into(),
            reason: LoadFailure::Incomplete,
        };
        assert_eq!(err.to_string(), "could not load component. Request : { name: about }");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn no_route_message() {
        assert_eq!(Error::NoRoute.to_string(), "no route specified");
    }
}

//! Component lifecycle runtime.
//!
//! Components are fetched on demand through a [`registry::ComponentLoader`],
//! mounted one at a time by a [`doorman::Doorman`], navigated between by a
//! history-aware [`router::Router`] and share state through a reactive
//! [`store::Store`].

pub mod alert;
pub mod component;
pub mod doorman;
pub mod dom;
pub mod error;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod store;

pub use alert::{Alert, AlertButton, TracingAlert};
pub use component::{Behaviors, EventMap, Lifecycle, Logic, Scope};
pub use doorman::{Doorman, RouteEntry, RouteRequest, RouteTable, Settings};
pub use dom::Node;
pub use error::{Error, LoadFailure, Result};
pub use registry::{ComponentDefinition, ComponentLoader, ComponentRegistry};
pub use router::{History, HistoryEntry, MemoryHistory, Router, RouterHandle};
pub use runtime::Runtime;
pub use store::{Store, StoreFront};

//! What a component is made of once its definition has been fetched.
//!
//! A definition names a *script*: the key of a factory in [`Behaviors`].
//! The factory runs once per mount with a [`Scope`] and returns the
//! component's [`Logic`], i.e. its `open` entry point plus lifecycle hooks.

pub mod builtin;

use crate::alert::Alert;
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::registry::ComponentRegistry;
use crate::router::RouterHandle;
use crate::store::StoreFront;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

pub type Hook = Rc<dyn Fn() -> Result<()>>;
pub type OpenFn = Rc<dyn Fn(Value) -> LocalBoxFuture<'static, Result<Value>>>;
pub type Handler = Rc<dyn Fn(&[Value]) -> Result<Value>>;
pub type Factory = Rc<dyn Fn(&Scope) -> Result<Logic>>;

/// Ordered open/close hooks. Either list may be empty.
#[derive(Clone, Default)]
pub struct Lifecycle {
    open: Vec<Hook>,
    close: Vec<Hook>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_open(mut self, hook: impl Fn() -> Result<()> + 'static) -> Self {
        self.open.push(Rc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn() -> Result<()> + 'static) -> Self {
        self.close.push(Rc::new(hook));
        self
    }

    pub fn open_hooks(&self) -> &[Hook] {
        &self.open
    }

    pub fn close_hooks(&self) -> &[Hook] {
        &self.close
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.close.is_empty()
    }

    /// Runs the open hooks in order; the first failure aborts.
    pub(crate) fn run_open(&self) -> Result<()> {
        self.open.iter().try_for_each(|hook| hook())
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("open", &self.open.len())
            .field("close", &self.close.len())
            .finish()
    }
}

/// Runs every hook even if some fail. Returns the number of failures.
pub(crate) fn run_close_hooks(hooks: &[Hook], component: &str, stage: &str) -> usize {
    let mut failures = 0;
    for (index, hook) in hooks.iter().enumerate() {
        if let Err(e) = hook() {
            failures += 1;
            tracing::warn!(component, stage, index, error = %e, "close hook failed");
        }
    }
    failures
}

/// A component's behavior, produced once by its factory.
#[derive(Clone)]
pub struct Logic {
    open: OpenFn,
    life: Lifecycle,
}

impl Logic {
    pub fn new<F, Fut>(open: F) -> Self
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = Result<Value>> + 'static,
    {
        Logic {
            open: Rc::new(move |data| open(data).boxed_local()),
            life: Lifecycle::default(),
        }
    }

    /// For components whose `open` never suspends.
    pub fn immediate<F>(open: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + 'static,
    {
        Logic::new(move |data| futures::future::ready(open(data)))
    }

    pub fn with_life(mut self, life: Lifecycle) -> Self {
        self.life = life;
        self
    }

    pub fn open(&self, data: Value) -> LocalBoxFuture<'static, Result<Value>> {
        (self.open)(data)
    }

    pub fn life(&self) -> &Lifecycle {
        &self.life
    }
}

impl fmt::Debug for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logic").field("life", &self.life).finish()
    }
}

/// Named event handlers a route declares for its component.
#[derive(Clone, Default)]
pub struct EventMap(HashMap<String, Handler>);

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&[Value]) -> Result<Value> + 'static,
    ) -> Self {
        self.0.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EventMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.0.keys().collect();
        names.sort();
        f.debug_tuple("EventMap").field(&names).finish()
    }
}

/// Dispatches to the declared handlers. Unknown names are an error.
#[derive(Clone, Debug)]
pub struct Emitter {
    events: EventMap,
}

impl Emitter {
    pub fn new(events: EventMap) -> Self {
        Self { events }
    }

    pub fn emit(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.events.0.get(name) {
            Some(handler) => handler(args),
            None => Err(Error::UndeclaredEvent(name.to_string())),
        }
    }
}

/// Everything a factory gets to build a component's logic.
#[derive(Clone)]
pub struct Scope {
    pub name: String,
    pub options: Value,
    pub mount: Node,
    pub node: Node,
    pub emit: Emitter,
    pub store: StoreFront,
    pub router: RouterHandle,
    pub components: Rc<ComponentRegistry>,
    pub alert: Rc<dyn Alert>,
}

impl Scope {
    /// Query helper scoped to the mount the component lives in.
    pub fn select(&self, selector: &str) -> Vec<Node> {
        self.mount.query_all(selector)
    }

    pub fn select_one(&self, selector: &str) -> Option<Node> {
        self.mount.query(selector)
    }
}

/// Script identifier → factory.
#[derive(Clone, Default)]
pub struct Behaviors {
    factories: HashMap<String, Factory>,
}

impl Behaviors {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table with the shell's stock behaviors already registered.
    pub fn with_builtins() -> Self {
        let mut behaviors = Self::new();
        builtin::register(&mut behaviors);
        behaviors
    }

    pub fn register(
        &mut self,
        script: impl Into<String>,
        factory: impl Fn(&Scope) -> Result<Logic> + 'static,
    ) -> &mut Self {
        self.factories.insert(script.into(), Rc::new(factory));
        self
    }

    pub fn get(&self, script: &str) -> Option<Factory> {
        self.factories.get(script).cloned()
    }

    pub fn contains(&self, script: &str) -> bool {
        self.factories.contains_key(script)
    }
}

impl fmt::Debug for Behaviors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scripts: Vec<_> = self.factories.keys().collect();
        scripts.sort();
        f.debug_struct("Behaviors").field("scripts", &scripts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn emitting_undeclared_event_fails() {
        let emitter = Emitter::new(EventMap::new().on("saved", |args| Ok(args[0].clone())));
        assert_eq!(emitter.emit("saved", &[json!(7)]).unwrap(), json!(7));
        let err = emitter.emit("deleted", &[]).unwrap_err();
        assert_eq!(err.to_string(), "emitter deleted not defined");
    }

    #[test]
    fn close_hooks_run_past_failures() {
        let ran = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (ran.clone(), ran.clone());
        let life = Lifecycle::new()
            .on_close(move || {
                a.borrow_mut().push(1);
                Err(Error::component("boom"))
            })
            .on_close(move || {
                b.borrow_mut().push(2);
                Ok(())
            });
        let failures = run_close_hooks(life.close_hooks(), "test", "inner");
        assert_eq!(failures, 1);
        assert_eq!(*ran.borrow(), vec![1, 2]);
    }

    #[test]
    fn open_hooks_stop_at_first_failure() {
        let ran = Rc::new(RefCell::new(0));
        let counter = ran.clone();
        let life = Lifecycle::new()
            .on_open(|| Err(Error::component("nope")))
            .on_open(move || {
                *counter.borrow_mut() += 1;
                Ok(())
            });
        assert!(life.run_open().is_err());
        assert_eq!(*ran.borrow(), 0);
    }

    #[tokio::test]
    async fn immediate_logic_resolves_like_async() {
        let sync = Logic::immediate(|data| Ok(json!({ "got": data })));
        let later = Logic::new(|data| async move {
            tokio::task::yield_now().await;
            Ok(json!({ "got": data }))
        });
        assert_eq!(sync.open(json!(1)).await.unwrap(), json!({"got": 1}));
        assert_eq!(later.open(json!(1)).await.unwrap(), json!({"got": 1}));
    }

    #[test]
    fn behaviors_lookup() {
        let mut behaviors = Behaviors::new();
        behaviors.register("noop", |_| Ok(Logic::immediate(|_| Ok(Value::Null))));
        assert!(behaviors.contains("noop"));
        assert!(behaviors.get("missing").is_none());
        assert!(Behaviors::with_builtins().contains("static"));
    }
}

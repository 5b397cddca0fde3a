//! History-aware navigation over the page's primary mount.

pub mod history;

pub use history::{History, HistoryEntry, MemoryHistory, PopState};

use crate::doorman::{Doorman, RouteRequest, RouteTable, Settings};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use serde_json::Value;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{info, warn};

pub struct Router {
    doorman: Doorman,
    history: Rc<dyn History>,
    home: String,
}

impl Router {
    /// Builds the router, registers it with `runtime` and loads whatever
    /// the current location points at. A failing first load is logged, not
    /// returned.
    pub async fn new(
        runtime: Rc<Runtime>,
        mount: Node,
        routes: RouteTable,
        settings: Settings,
        history: Rc<dyn History>,
    ) -> Result<Rc<Self>> {
        let home = settings.home.clone().ok_or(Error::MissingHome)?;
        let doorman = Doorman::new(runtime.clone(), mount, routes, settings)?;
        let router = Rc::new(Router {
            doorman,
            history,
            home,
        });
        runtime.set_router(Rc::downgrade(&router));

        if let Err(e) = router.handle_first_url().await {
            warn!(error = %e, "initial navigation failed");
        }
        Ok(router)
    }

    /// Loads `target` and records it as a new history entry.
    pub async fn to(&self, target: impl Into<RouteRequest>, data: Value) -> Result<Value> {
        let request = target.into();
        let (route, interface) = self.doorman.load_request(request.clone(), data).await?;

        let entry = HistoryEntry {
            route,
            query: request.query,
            hash: request.hash,
            opt: request.opt,
            previous: self.history.current().map(|prev| Box::new(prev.detached())),
        };
        let url = self.url_for(&entry);
        info!(url = %url, "navigated");
        self.history.push(entry, &url);
        self.doorman.runtime().alert().reset();
        Ok(interface)
    }

    pub async fn home(&self) -> Result<Value> {
        self.to(self.home.as_str(), Value::Null).await
    }

    /// Reacts to the history cursor moving (back/forward).
    pub async fn handle_navigation(&self, state: Option<HistoryEntry>) -> Result<Value> {
        self.doorman.runtime().alert().reset();
        match state {
            Some(entry) if self.history.location().path() != "/" => {
                info!(route = %entry.route, "history navigation");
                self.doorman.load(&entry, Value::Null).await
            }
            _ => self.handle_first_url().await,
        }
    }

    /// Derives the route from the location, rewrites the current record to
    /// its canonical form and loads it.
    async fn handle_first_url(&self) -> Result<Value> {
        let location = self.history.location();
        let segment = location
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or_default();

        let entry = if segment.is_empty() {
            HistoryEntry::new(&self.home)
        } else {
            HistoryEntry {
                query: location
                    .query()
                    .filter(|q| !q.is_empty())
                    .map(str::to_string),
                ..HistoryEntry::new(segment)
            }
        };
        let url = self.url_for(&entry);
        self.history.replace(entry.clone(), &url);
        self.doorman.load(&entry, Value::Null).await
    }

    fn url_for(&self, entry: &HistoryEntry) -> String {
        let origin = self.history.location().origin().ascii_serialization();
        let mut url = format!("{origin}/{}", entry.route);
        if let Some(query) = entry.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        if let Some(hash) = entry.hash.as_deref().filter(|h| !h.is_empty()) {
            url.push('#');
            url.push_str(hash);
        }
        url
    }

    pub async fn load(&self, target: impl Into<RouteRequest>, data: Value) -> Result<Value> {
        self.doorman.load(target, data).await
    }

    pub fn unload(&self) {
        self.doorman.unload();
    }

    pub fn restrict(&self) {
        self.doorman.restrict();
    }

    pub async fn preload<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.doorman.preload(names).await;
    }

    pub fn doorman(&self) -> &Doorman {
        &self.doorman
    }

    pub fn history(&self) -> &Rc<dyn History> {
        &self.history
    }

    pub fn home_route(&self) -> &str {
        &self.home
    }
}

/// Non-owning router reference handed to components.
#[derive(Clone, Default)]
pub struct RouterHandle(Weak<Router>);

impl RouterHandle {
    pub(crate) fn new(router: Weak<Router>) -> Self {
        Self(router)
    }

    pub fn get(&self) -> Result<Rc<Router>> {
        self.0.upgrade().ok_or(Error::RouterUnavailable)
    }

    pub async fn to(&self, target: impl Into<RouteRequest>, data: Value) -> Result<Value> {
        let router = self.get()?;
        router.to(target, data).await
    }

    pub async fn home(&self) -> Result<Value> {
        let router = self.get()?;
        router.home().await
    }
}

impl fmt::Debug for RouterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterHandle")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Alert, AlertButton};
    use crate::component::{Behaviors, Logic};
    use crate::doorman::RouteEntry;
    use crate::registry::{ComponentPayload, MemoryLoader};
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Default)]
    struct TestAlert {
        resets: Cell<usize>,
    }

    impl Alert for TestAlert {
        fn reset(&self) {
            self.resets.set(self.resets.get() + 1);
        }

        fn display(&self, _message: &str, _close: AlertButton, _action: Option<AlertButton>) {}
    }

    struct Fixture {
        loader: Rc<MemoryLoader>,
        runtime: Rc<Runtime>,
        alert: Rc<TestAlert>,
        history: Rc<MemoryHistory>,
        built: Rc<Cell<usize>>,
    }

    fn fixture(start: &str) -> Fixture {
        let loader = Rc::new(
            ["home", "a", "b"]
                .into_iter()
                .map(|name| {
                    let template = format!("<main name=\"{name}\">{name}</main>");
                    (name, ComponentPayload::new(name, &template, "counted"))
                })
                .collect::<MemoryLoader>(),
        );
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let mut behaviors = Behaviors::with_builtins();
        behaviors.register("counted", move |_| {
            counter.set(counter.get() + 1);
            Ok(Logic::immediate(Ok))
        });
        let alert = Rc::new(TestAlert::default());
        let runtime = Runtime::builder(loader.clone())
            .behaviors(behaviors)
            .alert(alert.clone())
            .build();
        Fixture {
            loader,
            runtime,
            alert,
            history: Rc::new(MemoryHistory::new(start).unwrap()),
            built,
        }
    }

    fn routes() -> RouteTable {
        ["home", "a", "b"]
            .into_iter()
            .map(|key| (key, RouteEntry::new(key)))
            .collect()
    }

    fn settings() -> Settings {
        Settings {
            default: None,
            home: Some("home".into()),
        }
    }

    async fn router(f: &Fixture) -> Rc<Router> {
        Router::new(
            f.runtime.clone(),
            Node::element("div"),
            routes(),
            settings(),
            f.history.clone(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn missing_home_fails_construction() {
        let f = fixture("http://app.test/");
        let result = Router::new(
            f.runtime.clone(),
            Node::element("div"),
            routes(),
            Settings::default(),
            f.history.clone(),
        )
        .await;
        assert!(matches!(result, Err(Error::MissingHome)));
    }

    #[tokio::test]
    async fn root_location_loads_home_and_replaces_the_record() {
        let f = fixture("http://app.test/");
        let router = router(&f).await;
        assert_eq!(router.doorman().current().as_deref(), Some("home"));
        assert_eq!(f.history.len(), 1);
        assert_eq!(f.history.location().as_str(), "http://app.test/home");
        assert_eq!(f.history.current().unwrap().route, "home");
    }

    #[tokio::test]
    async fn deep_link_keeps_its_query() {
        let f = fixture("http://app.test/a/ignored?tab=team");
        let router = router(&f).await;
        assert_eq!(router.doorman().current().as_deref(), Some("a"));
        let entry = f.history.current().unwrap();
        assert_eq!(entry.query.as_deref(), Some("tab=team"));
        assert_eq!(f.history.location().as_str(), "http://app.test/a?tab=team");
    }

    #[tokio::test]
    async fn failing_first_load_is_not_fatal() {
        let f = fixture("http://app.test/ghost");
        let router = router(&f).await;
        assert_eq!(router.doorman().current(), None);
        assert!(router.to("a", Value::Null).await.is_ok());
    }

    #[tokio::test]
    async fn to_pushes_entries_with_one_hop_previous() {
        let f = fixture("http://app.test/");
        let router = router(&f).await;
        router.to("a", Value::Null).await.unwrap();
        router
            .to(RouteRequest::route("b").with_query("x=1").with_hash("top"), Value::Null)
            .await
            .unwrap();

        let entry = f.history.current().unwrap();
        assert_eq!(entry.route, "b");
        let previous = entry.previous.unwrap();
        assert_eq!(previous.route, "a");
        assert!(previous.previous.is_none());
        assert_eq!(f.history.location().as_str(), "http://app.test/b?x=1#top");
        assert_eq!(f.history.len(), 3);
    }

    #[tokio::test]
    async fn failed_navigation_leaves_history_alone() {
        let f = fixture("http://app.test/");
        let router = router(&f).await;
        assert!(router.to("ghost", Value::Null).await.is_err());
        assert_eq!(f.history.len(), 1);
    }

    #[tokio::test]
    async fn back_restores_cached_component() {
        let f = fixture("http://app.test/");
        let router = router(&f).await;
        router.to("a", Value::Null).await.unwrap();
        let a_node = router.doorman().mount().first_child().unwrap();
        router.to("b", Value::Null).await.unwrap();

        let popped = f.history.back().unwrap();
        router.handle_navigation(popped.state).await.unwrap();

        assert_eq!(router.doorman().mount().first_child().unwrap(), a_node);
        assert_eq!(f.built.get(), 3);
        assert_eq!(f.loader.fetches(), 3);
    }

    #[tokio::test]
    async fn navigation_resets_the_alert() {
        let f = fixture("http://app.test/");
        let router = router(&f).await;
        let before = f.alert.resets.get();
        router.to("a", Value::Null).await.unwrap();
        router.handle_navigation(None).await.unwrap();
        assert_eq!(f.alert.resets.get(), before + 2);
    }

    #[tokio::test]
    async fn saved_entry_at_root_path_goes_home() {
        let f = fixture("http://app.test/");
        let router = router(&f).await;
        f.history.push(HistoryEntry::new("a"), "http://app.test/");
        let len = f.history.len();

        router.handle_navigation(f.history.current()).await.unwrap();

        assert_eq!(router.doorman().current().as_deref(), Some("home"));
        assert_eq!(f.history.len(), len);
        assert_eq!(f.history.current().unwrap().route, "home");
        assert_eq!(f.history.location().as_str(), "http://app.test/home");
    }

    #[tokio::test]
    async fn fallback_route_is_what_history_records() {
        let f = fixture("http://app.test/");
        let router = Router::new(
            f.runtime.clone(),
            Node::element("div"),
            routes(),
            Settings {
                default: Some("b".into()),
                home: Some("home".into()),
            },
            f.history.clone(),
        )
        .await
        .unwrap();

        router.to("unknown", Value::Null).await.unwrap();

        assert_eq!(router.doorman().current().as_deref(), Some("b"));
        assert_eq!(f.history.current().unwrap().route, "b");
        assert_eq!(f.history.location().as_str(), "http://app.test/b");
    }

    #[tokio::test]
    async fn handle_follows_the_router_lifetime() {
        let f = fixture("http://app.test/");
        let router = router(&f).await;
        let handle = f.runtime.router();
        assert_eq!(handle.to("b", json!({})).await.unwrap(), json!({"$query": ""}));
        assert_eq!(router.doorman().current().as_deref(), Some("b"));

        drop(router);
        assert!(matches!(handle.home().await, Err(Error::RouterUnavailable)));
    }
}

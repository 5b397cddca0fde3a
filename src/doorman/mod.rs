//! Mount manager: keeps at most one component attached to a mount node.
//!
//! A load resolves the route, clears the mount, fetches the definition,
//! attaches its node, instantiates its logic on first use and opens it.
//! Parsed nodes and instantiated logic are kept per component name so a
//! later visit reuses them.

pub mod route;

pub use route::{RouteEntry, RouteRequest, RouteTable, Settings};

use crate::component::{run_close_hooks, Emitter, Hook, Logic, Scope};
use crate::dom::{parse_fragment, Node};
use crate::error::{Error, Result};
use crate::registry::ComponentDefinition;
use crate::runtime::Runtime;
use crate::store::{OwnerId, Store};
use route::RouteDescriptor;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info};

/// A fully activated component kept for reuse.
struct Instance {
    node: Node,
    logic: Logic,
    restricted: bool,
}

enum Markup {
    Unparsed(String),
    Parsed(Node),
}

enum Behavior {
    Uninstantiated(String),
    Instantiated(Logic),
}

/// Definition, cached instance and route descriptor merged for one load.
struct Pending {
    name: String,
    restricted: bool,
    markup: Markup,
    behavior: Behavior,
    descriptor: RouteDescriptor,
}

/// How to shut down whatever is attached right now.
struct CloseHandle {
    component: String,
    owner: OwnerId,
    outer: Vec<Hook>,
    inner: Vec<Hook>,
}

impl CloseHandle {
    fn run(self, store: &Store) {
        debug!(component = %self.component, "closing");
        store.remove_front(self.owner);
        run_close_hooks(&self.outer, &self.component, "route");
        run_close_hooks(&self.inner, &self.component, "logic");
    }
}

pub struct Doorman {
    runtime: Rc<Runtime>,
    mount: Node,
    routes: RouteTable,
    settings: Settings,
    instances: RefCell<HashMap<String, Instance>>,
    close: RefCell<Option<CloseHandle>>,
    ticket: Cell<u64>,
}

impl Doorman {
    pub fn new(runtime: Rc<Runtime>, mount: Node, routes: RouteTable, settings: Settings) -> Result<Self> {
        routes.validate()?;
        Ok(Self {
            runtime,
            mount,
            routes,
            settings,
            instances: RefCell::new(HashMap::new()),
            close: RefCell::new(None),
            ticket: Cell::new(0),
        })
    }

    pub fn mount(&self) -> &Node {
        &self.mount
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn runtime(&self) -> &Rc<Runtime> {
        &self.runtime
    }

    /// Loads the component for `target` into the mount and returns the
    /// interface its `open` produced.
    pub async fn load(&self, target: impl Into<RouteRequest>, data: Value) -> Result<Value> {
        self.load_request(target.into(), data)
            .await
            .map(|(_, interface)| interface)
    }

    /// Like `load`, also reporting which route key was actually used.
    pub(crate) async fn load_request(&self, request: RouteRequest, data: Value) -> Result<(String, Value)> {
        let route = self.resolve(request.route.as_deref()).ok_or(Error::NoRoute)?;
        let entry = self.routes.get(&route).ok_or(Error::NoRoute)?;
        let descriptor = RouteDescriptor::new(route.clone(), entry, request);

        let ticket = self.ticket.get() + 1;
        self.ticket.set(ticket);
        self.clear();
        info!(route = %route, component = %descriptor.comp, "loading");

        let definition = self.runtime.registry().get(&descriptor.comp).await?;
        self.ensure_current(ticket, &route)?;

        let pending = self.merge(definition, descriptor);
        let data = with_query(data, pending.descriptor.query.as_deref());
        let interface = self.activate(pending, data, ticket).await?;
        Ok((route, interface))
    }

    fn resolve(&self, requested: Option<&str>) -> Option<String> {
        let route = requested
            .filter(|key| self.routes.contains(key))
            .map(str::to_string)
            .or_else(|| self.settings.default.clone())
            .or_else(|| {
                if self.routes.len() == 1 {
                    self.routes.keys().next().map(str::to_string)
                } else {
                    None
                }
            });
        route.filter(|key| self.routes.contains(key))
    }

    fn ensure_current(&self, ticket: u64, route: &str) -> Result<()> {
        if self.ticket.get() == ticket {
            Ok(())
        } else {
            debug!(route, "load superseded");
            Err(Error::Superseded {
                route: route.to_string(),
            })
        }
    }

    fn merge(&self, definition: ComponentDefinition, descriptor: RouteDescriptor) -> Pending {
        let instances = self.instances.borrow();
        match instances.get(&descriptor.comp) {
            Some(instance) => Pending {
                name: definition.name,
                restricted: instance.restricted,
                markup: Markup::Parsed(instance.node.clone()),
                behavior: Behavior::Instantiated(instance.logic.clone()),
                descriptor,
            },
            None => Pending {
                name: definition.name,
                restricted: definition.restricted,
                markup: Markup::Unparsed(definition.template),
                behavior: Behavior::Uninstantiated(definition.script),
                descriptor,
            },
        }
    }

    async fn activate(&self, pending: Pending, data: Value, ticket: u64) -> Result<Value> {
        let Pending {
            name,
            restricted,
            markup,
            behavior,
            descriptor,
        } = pending;

        let node = match markup {
            Markup::Parsed(node) => node,
            Markup::Unparsed(template) => parse_fragment(template.trim())
                .into_iter()
                .next()
                .ok_or_else(|| Error::EmptyTemplate { name: name.clone() })?,
        };
        self.attach(&node);

        let logic = match behavior {
            Behavior::Instantiated(logic) => logic,
            Behavior::Uninstantiated(script) => self.summon(&node, &name, &script, &descriptor)?,
        };

        let interface = logic.open(data).await?;
        if let Err(e) = self.ensure_current(ticket, &descriptor.route) {
            // A newer load of the same cached component owns this node now.
            if self.mount.first_child().as_ref() != Some(&node) {
                self.dispose(&node, &name, &logic);
            }
            return Err(e);
        }

        descriptor.life.run_open()?;
        *self.close.borrow_mut() = Some(CloseHandle {
            component: name.clone(),
            owner: OwnerId::from(&node),
            outer: descriptor.life.close_hooks().to_vec(),
            inner: logic.life().close_hooks().to_vec(),
        });

        if node.attr("name").as_deref() == Some(descriptor.comp.as_str()) {
            self.instances
                .borrow_mut()
                .entry(descriptor.comp.clone())
                .or_insert(Instance {
                    node,
                    logic,
                    restricted,
                });
        }
        info!(
            route = %descriptor.route,
            component = %name,
            hash = descriptor.hash.as_deref().unwrap_or_default(),
            "loaded"
        );
        Ok(interface)
    }

    /// Swaps `node` in unless the attached node carries the same name.
    fn attach(&self, node: &Node) {
        let current = self.current();
        if current.is_some() && current == node.attr("name") {
            return;
        }
        self.mount.remove_first_child();
        self.mount.append_child(node);
    }

    fn summon(&self, node: &Node, name: &str, script: &str, descriptor: &RouteDescriptor) -> Result<Logic> {
        let factory = self
            .runtime
            .behaviors()
            .get(script)
            .ok_or_else(|| Error::UnknownScript {
                name: name.to_string(),
                script: script.to_string(),
            })?;
        let scope = Scope {
            name: name.to_string(),
            options: descriptor.opt.clone().unwrap_or(Value::Null),
            mount: self.mount.clone(),
            node: node.clone(),
            emit: Emitter::new(descriptor.on.clone()),
            store: self.runtime.store().create(node),
            router: self.runtime.router(),
            components: self.runtime.registry().clone(),
            alert: self.runtime.alert(),
        };
        debug!(component = name, script, "instantiating");
        factory(&scope)
    }

    /// Undoes an open that lost the race to a newer load.
    fn dispose(&self, node: &Node, name: &str, logic: &Logic) {
        self.runtime.store().remove_front(OwnerId::from(node));
        run_close_hooks(logic.life().close_hooks(), name, "logic");
    }

    /// Closes the attached component (once) and empties the mount.
    pub fn clear(&self) {
        let handle = self.close.borrow_mut().take();
        if let Some(handle) = handle {
            handle.run(self.runtime.store());
        }
        self.mount.clear_children();
    }

    pub fn unload(&self) {
        self.clear();
    }

    /// Drops restricted definitions and instances, e.g. after logout.
    pub fn restrict(&self) {
        self.runtime.registry().restrict();
        self.instances.borrow_mut().retain(|name, instance| {
            if instance.restricted {
                debug!(component = %name, "evicting restricted instance");
            }
            !instance.restricted
        });
    }

    /// Warms the definition cache. Failures are ignored.
    pub async fn preload<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registry = self.runtime.registry();
        let fetches = names.into_iter().map(|name| {
            let name = name.as_ref().to_string();
            async move {
                if let Err(e) = registry.get(&name).await {
                    debug!(component = %name, error = %e, "preload failed");
                }
            }
        });
        futures::future::join_all(fetches).await;
    }

    /// Name of the attached component, if any.
    pub fn current(&self) -> Option<String> {
        self.mount.first_child().and_then(|node| node.attr("name"))
    }

    pub fn is_cached(&self, component: &str) -> bool {
        self.instances.borrow().contains_key(component)
    }
}

fn with_query(data: Value, query: Option<&str>) -> Value {
    let query = Value::String(query.unwrap_or_default().to_string());
    match data {
        Value::Null => {
            let mut map = Map::new();
            map.insert("$query".to_string(), query);
            Value::Object(map)
        }
        Value::Object(mut map) => {
            map.insert("$query".to_string(), query);
            Value::Object(map)
        }
        other => other,
    }
}

//! Shared services every mount manager and component sees.

use crate::alert::{Alert, TracingAlert};
use crate::component::Behaviors;
use crate::registry::{ComponentLoader, ComponentRegistry};
use crate::router::{Router, RouterHandle};
use crate::store::Store;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub struct Runtime {
    store: Rc<Store>,
    registry: Rc<ComponentRegistry>,
    behaviors: Behaviors,
    alert: Rc<dyn Alert>,
    router: RefCell<Weak<Router>>,
}

impl Runtime {
    pub fn builder(loader: Rc<dyn ComponentLoader>) -> RuntimeBuilder {
        RuntimeBuilder {
            loader,
            store: None,
            behaviors: Behaviors::with_builtins(),
            alert: Rc::new(TracingAlert),
        }
    }

    pub fn store(&self) -> &Rc<Store> {
        &self.store
    }

    pub fn registry(&self) -> &Rc<ComponentRegistry> {
        &self.registry
    }

    pub fn behaviors(&self) -> &Behaviors {
        &self.behaviors
    }

    pub fn alert(&self) -> Rc<dyn Alert> {
        self.alert.clone()
    }

    /// Handle to the page router, dangling until one is registered.
    pub fn router(&self) -> RouterHandle {
        RouterHandle::new(self.router.borrow().clone())
    }

    pub(crate) fn set_router(&self, router: Weak<Router>) {
        *self.router.borrow_mut() = router;
    }
}

pub struct RuntimeBuilder {
    loader: Rc<dyn ComponentLoader>,
    store: Option<Rc<Store>>,
    behaviors: Behaviors,
    alert: Rc<dyn Alert>,
}

impl RuntimeBuilder {
    pub fn store(mut self, store: Rc<Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the behavior table (built-ins included by default).
    pub fn behaviors(mut self, behaviors: Behaviors) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn alert(mut self, alert: Rc<dyn Alert>) -> Self {
        self.alert = alert;
        self
    }

    pub fn build(self) -> Rc<Runtime> {
        Rc::new(Runtime {
            store: self.store.unwrap_or_default(),
            registry: Rc::new(ComponentRegistry::new(self.loader)),
            behaviors: self.behaviors,
            alert: self.alert,
            router: RefCell::new(Weak::new()),
        })
    }
}

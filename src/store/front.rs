use super::{OwnerId, Store, WatcherId};
use crate::error::Result;
use serde_json::{Map, Value};
use std::rc::Rc;

/// A store view handed to one component. Reads and writes reach the whole
/// store; watch registrations are tagged with the front's owner.
#[derive(Clone)]
pub struct StoreFront {
    store: Rc<Store>,
    owner: OwnerId,
}

impl StoreFront {
    pub(super) fn new(store: Rc<Store>, owner: OwnerId) -> Self {
        Self { store, owner }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.store.set(key, value)
    }

    pub fn remove(&self, key: &str) {
        self.store.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    pub fn watch(&self, key: &str, callback: impl Fn(&Value) + 'static) -> Result<WatcherId> {
        self.store.watch(self.owner, key, callback)
    }

    pub fn unwatch(&self, key: &str, id: WatcherId) -> bool {
        self.store.unwatch(self.owner, key, id)
    }

    /// Read-only shallow snapshot.
    pub fn state(&self) -> Map<String, Value> {
        self.store.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fronts_only_unwatch_their_own() {
        let store = Rc::new(Store::new());
        let a = store.create(OwnerId::new(10));
        let b = store.create(OwnerId::new(11));

        let id = a.watch("theme", |_| {}).unwrap();
        assert!(!b.unwatch("theme", id));
        assert_eq!(store.watcher_count("theme"), 1);
        assert!(a.unwatch("theme", id));
    }

    #[test]
    fn snapshot_is_detached() {
        let store = Rc::new(Store::new());
        let front = store.create(OwnerId::new(1));
        front.set("a", json!(1)).unwrap();
        let mut snapshot = front.state();
        snapshot.insert("a".into(), json!(99));
        assert_eq!(front.get("a"), Some(json!(1)));
    }
}

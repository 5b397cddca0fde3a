//! Reactive key/value state shared by every mounted component.
//!
//! One [`Store`] lives in the [`Runtime`](crate::runtime::Runtime). Entries
//! are either plain JSON values or accessor pairs (getter/setter closures)
//! for computed or validated fields. Watchers are registered per owner so a
//! component's registrations can be dropped in one go when it closes.

mod front;

pub use front::StoreFront;

use crate::dom::{Node, NodeId};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

pub type Getter = Rc<dyn Fn() -> Value>;
pub type Setter = Rc<dyn Fn(Value) -> Result<()>>;
pub type WatchCallback = Rc<dyn Fn(&Value)>;

/// One slot of the state mapping.
#[derive(Clone)]
pub enum StateEntry {
    Plain(Value),
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

impl StateEntry {
    pub fn accessor(
        get: impl Fn() -> Value + 'static,
        set: impl Fn(Value) -> Result<()> + 'static,
    ) -> Self {
        StateEntry::Accessor {
            get: Some(Rc::new(get)),
            set: Some(Rc::new(set)),
        }
    }

    pub fn read_only(get: impl Fn() -> Value + 'static) -> Self {
        StateEntry::Accessor {
            get: Some(Rc::new(get)),
            set: None,
        }
    }

    fn read(&self) -> Value {
        match self {
            StateEntry::Plain(value) => value.clone(),
            StateEntry::Accessor { get: Some(get), .. } => get(),
            StateEntry::Accessor { get: None, .. } => Value::Null,
        }
    }
}

impl From<Value> for StateEntry {
    fn from(value: Value) -> Self {
        StateEntry::Plain(value)
    }
}

impl fmt::Debug for StateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateEntry::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
            StateEntry::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

/// Identity of a watcher owner. Carries no lifecycle control over the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    pub fn new(raw: u64) -> Self {
        OwnerId(raw)
    }
}

impl From<NodeId> for OwnerId {
    fn from(id: NodeId) -> Self {
        OwnerId(id.get())
    }
}

impl From<&Node> for OwnerId {
    fn from(node: &Node) -> Self {
        node.id().into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(u64);

struct Watcher {
    owner: OwnerId,
    id: WatcherId,
    callback: WatchCallback,
}

#[derive(Default)]
struct StoreInner {
    state: BTreeMap<String, StateEntry>,
    watchers: HashMap<String, Vec<Watcher>>,
    next_watcher: u64,
}

#[derive(Default)]
pub struct Store {
    inner: RefCell<StoreInner>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates an untouched store. Fails, leaving the state as it was, if
    /// any key is already present.
    pub fn initialise<I, K, E>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<String>,
        E: Into<StateEntry>,
    {
        let mut inner = self.inner.borrow_mut();
        if !inner.state.is_empty() {
            return Err(Error::AlreadyInitialised);
        }
        for (key, entry) in values {
            inner.state.insert(key.into(), entry.into());
        }
        tracing::debug!(keys = inner.state.len(), "store initialised");
        Ok(())
    }

    /// Writes `value` then notifies the key's watchers, in registration
    /// order, before returning.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let setter = {
            let mut inner = self.inner.borrow_mut();
            match inner.state.get(key) {
                Some(StateEntry::Accessor { set: Some(set), .. }) => Some(set.clone()),
                Some(StateEntry::Accessor { set: None, .. }) => {
                    return Err(Error::ReadOnlyKey(key.to_string()));
                }
                _ => {
                    inner
                        .state
                        .insert(key.to_string(), StateEntry::Plain(value.clone()));
                    None
                }
            }
        };
        if let Some(set) = setter {
            set(value.clone())?;
        }
        self.trigger(key, &value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let entry = self.inner.borrow().state.get(key).cloned();
        entry.map(|entry| entry.read())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().state.contains_key(key)
    }

    /// Deletes a plain key, or resets an accessor key to `null` while keeping
    /// the accessor installed. Drops every watcher of `key` either way.
    pub fn remove(&self, key: &str) {
        let setter = {
            let mut inner = self.inner.borrow_mut();
            inner.watchers.remove(key);
            match inner.state.get(key) {
                Some(StateEntry::Accessor { set, .. }) => set.clone(),
                Some(StateEntry::Plain(_)) => {
                    inner.state.remove(key);
                    None
                }
                None => None,
            }
        };
        if let Some(set) = setter {
            if let Err(e) = set(Value::Null) {
                tracing::warn!(key, error = %e, "accessor rejected reset");
            }
        }
    }

    /// Shallow snapshot of the state with accessors evaluated.
    pub fn state(&self) -> Map<String, Value> {
        let entries: Vec<(String, StateEntry)> = self
            .inner
            .borrow()
            .state
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries
            .into_iter()
            .map(|(key, entry)| (key, entry.read()))
            .collect()
    }

    pub fn watch(
        &self,
        owner: OwnerId,
        key: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> Result<WatcherId> {
        if key.trim().is_empty() {
            return Err(Error::InvalidWatcher("key must be a non-empty string".into()));
        }
        let mut inner = self.inner.borrow_mut();
        inner.next_watcher += 1;
        let id = WatcherId(inner.next_watcher);
        inner
            .watchers
            .entry(key.to_string())
            .or_default()
            .push(Watcher {
                owner,
                id,
                callback: Rc::new(callback),
            });
        Ok(id)
    }

    /// Removes one registration. Only the owner that created it can remove it.
    pub fn unwatch(&self, owner: OwnerId, key: &str, id: WatcherId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.watchers.get_mut(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|w| w.owner != owner || w.id != id);
        before != list.len()
    }

    /// Drops every registration of `owner`, across all keys.
    pub fn remove_front(&self, owner: OwnerId) {
        let mut inner = self.inner.borrow_mut();
        for list in inner.watchers.values_mut() {
            list.retain(|w| w.owner != owner);
        }
    }

    /// A view over this store whose watch registrations belong to `owner`.
    pub fn create(self: &Rc<Self>, owner: impl Into<OwnerId>) -> StoreFront {
        StoreFront::new(self.clone(), owner.into())
    }

    pub fn watcher_count(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .watchers
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn owner_watcher_count(&self, owner: OwnerId) -> usize {
        self.inner
            .borrow()
            .watchers
            .values()
            .flatten()
            .filter(|w| w.owner == owner)
            .count()
    }

    fn trigger(&self, key: &str, value: &Value) {
        // Callbacks may re-enter the store, so none of them run under a borrow.
        let callbacks: Vec<WatchCallback> = self
            .inner
            .borrow()
            .watchers
            .get(key)
            .map(|list| list.iter().map(|w| w.callback.clone()).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn initialise_only_once() {
        let store = Store::new();
        store.initialise([("a", json!(1))]).unwrap();
        let err = store.initialise([("b", json!(2))]).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialised));
        assert_eq!(store.state(), json!({"a": 1}).as_object().cloned().unwrap());
    }

    #[test]
    fn initialise_rejected_after_set() {
        let store = Store::new();
        store.set("x", json!(true)).unwrap();
        assert!(store.initialise([("a", json!(1))]).is_err());
    }

    #[test]
    fn watcher_sees_only_later_values() {
        let store = Store::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        store.set("k", json!(1)).unwrap();
        let sink = seen.clone();
        store
            .watch(OwnerId::new(1), "k", move |v| sink.borrow_mut().push(v.clone()))
            .unwrap();
        store.set("k", json!(2)).unwrap();
        assert_eq!(*seen.borrow(), vec![json!(2)]);
    }

    #[test]
    fn watchers_fire_in_registration_order() {
        let store = Store::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = order.clone();
            store
                .watch(OwnerId::new(n), "k", move |_| order.borrow_mut().push(n))
                .unwrap();
        }
        store.set("k", json!("v")).unwrap();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn callbacks_may_reenter() {
        let store = Rc::new(Store::new());
        let inner = store.clone();
        store
            .watch(OwnerId::new(1), "a", move |v| {
                inner.set("b", v.clone()).unwrap();
            })
            .unwrap();
        store.set("a", json!(5)).unwrap();
        assert_eq!(store.get("b"), Some(json!(5)));
    }

    #[test]
    fn empty_key_is_an_invalid_watcher() {
        let store = Store::new();
        let err = store.watch(OwnerId::new(1), "  ", |_| {}).unwrap_err();
        assert!(matches!(err, Error::InvalidWatcher(_)));
    }

    #[test]
    fn remove_front_keeps_other_owners() {
        let store = Store::new();
        let me = OwnerId::new(1);
        let other = OwnerId::new(2);
        store.watch(me, "a", |_| {}).unwrap();
        store.watch(me, "b", |_| {}).unwrap();
        store.watch(other, "a", |_| {}).unwrap();

        store.remove_front(me);

        assert_eq!(store.owner_watcher_count(me), 0);
        assert_eq!(store.owner_watcher_count(other), 1);
        assert_eq!(store.watcher_count("a"), 1);
        assert_eq!(store.watcher_count("b"), 0);
    }

    #[test]
    fn unwatch_is_owner_scoped() {
        let store = Store::new();
        let id = store.watch(OwnerId::new(1), "a", |_| {}).unwrap();
        assert!(!store.unwatch(OwnerId::new(2), "a", id));
        assert!(store.unwatch(OwnerId::new(1), "a", id));
        assert_eq!(store.watcher_count("a"), 0);
    }

    #[test]
    fn remove_deletes_plain_keys_and_watchers() {
        let store = Store::new();
        store.set("a", json!(1)).unwrap();
        store.watch(OwnerId::new(1), "a", |_| {}).unwrap();
        store.remove("a");
        assert!(!store.contains("a"));
        assert_eq!(store.watcher_count("a"), 0);
    }

    #[test]
    fn accessor_entries_survive_remove() {
        let backing = Rc::new(RefCell::new(json!("init")));
        let (read, write) = (backing.clone(), backing.clone());
        let store = Store::new();
        store
            .initialise([(
                "name",
                StateEntry::accessor(
                    move || read.borrow().clone(),
                    move |v| {
                        *write.borrow_mut() = v;
                        Ok(())
                    },
                ),
            )])
            .unwrap();

        store.set("name", json!("bob")).unwrap();
        assert_eq!(store.get("name"), Some(json!("bob")));

        store.remove("name");
        assert!(store.contains("name"));
        assert_eq!(store.get("name"), Some(Value::Null));
    }

    #[test]
    fn rejecting_setter_suppresses_notification() {
        let store = Store::new();
        store
            .initialise([(
                "age",
                StateEntry::accessor(
                    || json!(0),
                    |v| match v.as_u64() {
                        Some(_) => Ok(()),
                        None => Err(Error::component("age must be a number")),
                    },
                ),
            )])
            .unwrap();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        store
            .watch(OwnerId::new(1), "age", move |_| flag.set(true))
            .unwrap();

        assert!(store.set("age", json!("old")).is_err());
        assert!(!fired.get());
        store.set("age", json!(3)).unwrap();
        assert!(fired.get());
    }

    #[test]
    fn read_only_accessor() {
        let store = Store::new();
        store
            .initialise([("pi", StateEntry::read_only(|| json!(1.5)))])
            .unwrap();
        assert!(matches!(
            store.set("pi", json!(3)),
            Err(Error::ReadOnlyKey(_))
        ));
        assert_eq!(store.state().get("pi"), Some(&json!(1.5)));
    }
}

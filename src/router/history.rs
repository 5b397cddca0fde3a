use crate::doorman::RouteRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use tracing::warn;
use url::Url;

/// State recorded with each history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt: Option<Value>,
    /// The entry navigated away from, one hop only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Box<HistoryEntry>>,
}

impl HistoryEntry {
    pub fn new(route: &str) -> Self {
        Self {
            route: route.to_string(),
            query: None,
            hash: None,
            opt: None,
            previous: None,
        }
    }

    /// Copy without the `previous` link.
    pub fn detached(&self) -> Self {
        Self {
            previous: None,
            ..self.clone()
        }
    }
}

impl From<&HistoryEntry> for RouteRequest {
    fn from(entry: &HistoryEntry) -> Self {
        RouteRequest {
            route: Some(entry.route.clone()),
            query: entry.query.clone(),
            hash: entry.hash.clone(),
            opt: entry.opt.clone(),
        }
    }
}

impl From<HistoryEntry> for RouteRequest {
    fn from(entry: HistoryEntry) -> Self {
        RouteRequest::from(&entry)
    }
}

/// The session history the router writes to.
pub trait History {
    fn push(&self, entry: HistoryEntry, url: &str);
    fn replace(&self, entry: HistoryEntry, url: &str);
    /// State of the current record.
    fn current(&self) -> Option<HistoryEntry>;
    fn location(&self) -> Url;
}

/// Delivered when the cursor moves; carries the now-current state.
#[derive(Debug, Clone, PartialEq)]
pub struct PopState {
    pub state: Option<HistoryEntry>,
}

#[derive(Debug, Clone)]
struct Record {
    url: Url,
    state: Option<HistoryEntry>,
}

/// In-process history: a stack of records and a cursor.
#[derive(Debug)]
pub struct MemoryHistory {
    records: RefCell<Vec<Record>>,
    cursor: Cell<usize>,
}

impl MemoryHistory {
    pub fn new(start: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            records: RefCell::new(vec![Record {
                url: Url::parse(start)?,
                state: None,
            }]),
            cursor: Cell::new(0),
        })
    }

    fn resolve(&self, url: &str) -> Url {
        let base = self.location();
        match base.join(url) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(url, error = %e, "unparseable history url, keeping location");
                base
            }
        }
    }

    pub fn back(&self) -> Option<PopState> {
        let cursor = self.cursor.get();
        if cursor == 0 {
            return None;
        }
        self.cursor.set(cursor - 1);
        Some(self.pop_state())
    }

    pub fn forward(&self) -> Option<PopState> {
        let cursor = self.cursor.get();
        if cursor + 1 >= self.records.borrow().len() {
            return None;
        }
        self.cursor.set(cursor + 1);
        Some(self.pop_state())
    }

    fn pop_state(&self) -> PopState {
        PopState {
            state: self.current(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn index(&self) -> usize {
        self.cursor.get()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor.get() > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor.get() + 1 < self.len()
    }
}

impl History for MemoryHistory {
    fn push(&self, entry: HistoryEntry, url: &str) {
        let url = self.resolve(url);
        let mut records = self.records.borrow_mut();
        let cursor = self.cursor.get();
        records.truncate(cursor + 1);
        records.push(Record {
            url,
            state: Some(entry),
        });
        self.cursor.set(records.len() - 1);
    }

    fn replace(&self, entry: HistoryEntry, url: &str) {
        let url = self.resolve(url);
        let mut records = self.records.borrow_mut();
        if let Some(record) = records.get_mut(self.cursor.get()) {
            *record = Record {
                url,
                state: Some(entry),
            };
        }
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.records
            .borrow()
            .get(self.cursor.get())
            .and_then(|record| record.state.clone())
    }

    fn location(&self) -> Url {
        let records = self.records.borrow();
        // The stack is never empty: `new` seeds it and nothing removes the
        // record under the cursor.
        records[self.cursor.get()].url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_truncates_forward_records() {
        let history = MemoryHistory::new("http://app.test/").unwrap();
        history.push(HistoryEntry::new("a"), "http://app.test/a");
        history.push(HistoryEntry::new("b"), "http://app.test/b");
        assert_eq!(history.back().unwrap().state.unwrap().route, "a");
        history.push(HistoryEntry::new("c"), "/c");

        assert_eq!(history.len(), 3);
        assert!(!history.can_go_forward());
        assert_eq!(history.location().path(), "/c");
    }

    #[test]
    fn back_and_forward_move_the_cursor() {
        let history = MemoryHistory::new("http://app.test/").unwrap();
        assert!(history.back().is_none());
        history.push(HistoryEntry::new("a"), "http://app.test/a");

        let popped = history.back().unwrap();
        assert_eq!(popped.state, None);
        assert_eq!(history.location().path(), "/");

        let popped = history.forward().unwrap();
        assert_eq!(popped.state.unwrap().route, "a");
        assert!(history.forward().is_none());
    }

    #[test]
    fn replace_rewrites_the_current_record() {
        let history = MemoryHistory::new("http://app.test/about?x=1").unwrap();
        history.replace(HistoryEntry::new("about"), "http://app.test/about?x=1");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().unwrap().route, "about");
        assert_eq!(history.location().query(), Some("x=1"));
    }

    #[test]
    fn entries_serialize_without_empty_fields() {
        let mut entry = HistoryEntry::new("b");
        entry.previous = Some(Box::new(HistoryEntry::new("a")));
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"route":"b","previous":{"route":"a"}}"#);
        assert_eq!(entry.detached().previous, None);
    }
}

//! In-memory rendering surface.
//!
//! A small node tree standing in for the host document: markup parsing,
//! selector queries scoped to a root, attach/detach of children and
//! attribute access. Nodes are reference-counted handles; cloning a
//! [`Node`] clones the handle, not the subtree.

mod parser;
mod selector;

pub use parser::parse_fragment;
pub use selector::Selector;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a node. Stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

struct NodeData {
    id: NodeId,
    kind: NodeKind,
    children: Vec<Node>,
    parent: Weak<RefCell<NodeData>>,
}

#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            id: NodeId::next(),
            kind,
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    pub fn element(tag: &str) -> Self {
        Self::from_kind(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn text(content: &str) -> Self {
        Self::from_kind(NodeKind::Text(content.to_string()))
    }

    /// Builder-style attribute setter, handy for mount points.
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn id(&self) -> NodeId {
        self.0.borrow().id
    }

    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind.clone()
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Sets or replaces an attribute. No-op on text nodes.
    pub fn set_attr(&self, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.0.borrow_mut().kind {
            let name = name.to_ascii_lowercase();
            match attrs.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name, value.to_string())),
            }
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    /// Appends `child`, detaching it from its previous parent first.
    pub fn append_child(&self, child: &Node) {
        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child);
        }
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Removes `child` if it is a direct child. Returns whether it was.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut data = self.0.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| c != child);
            before != data.children.len()
        };
        if removed {
            child.0.borrow_mut().parent = Weak::new();
        }
        removed
    }

    pub fn remove_first_child(&self) -> Option<Node> {
        let first = self.first_child()?;
        self.remove_child(&first);
        Some(first)
    }

    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Node> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    pub fn text_content(&self) -> String {
        match &self.0.borrow().kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => self
                .children()
                .iter()
                .map(Node::text_content)
                .collect::<String>(),
        }
    }

    /// Descendants matching `selector`, in document order. An unparsable
    /// selector matches nothing.
    pub fn query_all(&self, selector: &str) -> Vec<Node> {
        let Some(selector) = Selector::parse(selector) else {
            tracing::debug!(selector, "ignoring unparsable selector");
            return Vec::new();
        };
        self.descendants()
            .into_iter()
            .filter(|node| selector.matches_within(node, self))
            .collect()
    }

    pub fn query(&self, selector: &str) -> Option<Node> {
        self.query_all(selector).into_iter().next()
    }

    /// Serializes the subtree back to markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self.kind() {
            NodeKind::Text(text) => out.push_str(&parser::escape_text(&text)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(&tag);
                for (name, value) in &attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, parser::escape_attr(value)));
                }
                out.push('>');
                if parser::is_void(&tag) {
                    return;
                }
                for child in self.children() {
                    child.write_markup(out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Element { tag, attrs } => f
                .debug_struct("Element")
                .field("id", &data.id.0)
                .field("tag", tag)
                .field("attrs", attrs)
                .field("children", &data.children.len())
                .finish(),
            NodeKind::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_moves_node_between_parents() {
        let a = Node::element("div");
        let b = Node::element("div");
        let child = Node::element("span");

        a.append_child(&child);
        b.append_child(&child);

        assert_eq!(a.child_count(), 0);
        assert_eq!(b.first_child(), Some(child.clone()));
        assert_eq!(child.parent(), Some(b));
    }

    #[test]
    fn clear_children_orphans_them() {
        let mount = Node::element("div");
        let child = Node::element("p");
        mount.append_child(&child);
        mount.clear_children();
        assert!(mount.first_child().is_none());
        assert!(child.parent().is_none());
    }

    #[test]
    fn attributes_are_case_insensitive() {
        let node = Node::element("DIV").with_attr("Name", "home");
        assert_eq!(node.tag().as_deref(), Some("div"));
        assert_eq!(node.attr("name").as_deref(), Some("home"));
        node.set_attr("NAME", "about");
        assert_eq!(node.attr("name").as_deref(), Some("about"));
    }

    #[test]
    fn markup_round_trips_simple_tree() {
        let nodes = parse_fragment(r#"<section name="home"><p class="lead">Hi &amp; bye</p><br></section>"#);
        assert_eq!(
            nodes[0].to_markup(),
            r#"<section name="home"><p class="lead">Hi &amp; bye</p><br></section>"#
        );
        assert_eq!(nodes[0].text_content(), "Hi & bye");
    }
}

//! Stock behaviors available to every definition.
//!
//! - `static`: no logic; `open` hands the navigation data back.
//! - `bind`: fills every `[data-bind=key]` element inside the component
//!   with the store value under `key` and keeps it current while mounted.

use super::{Behaviors, Lifecycle, Logic, Scope};
use crate::dom::Node;
use serde_json::{json, Value};
use tracing::debug;

pub fn register(behaviors: &mut Behaviors) {
    behaviors.register("static", static_behavior);
    behaviors.register("bind", bind_behavior);
}

fn static_behavior(_scope: &Scope) -> crate::Result<Logic> {
    Ok(Logic::immediate(Ok))
}

fn bind_behavior(scope: &Scope) -> crate::Result<Logic> {
    let scope = scope.clone();
    let name = scope.name.clone();
    let open = move |_data: Value| {
        let mut bound = Vec::new();
        for node in scope.node.query_all("[data-bind]") {
            let Some(key) = node.attr("data-bind") else {
                continue;
            };
            render(&node, scope.store.get(&key).as_ref());
            let target = node.clone();
            // Watchers die with the front when the component unmounts.
            scope
                .store
                .watch(&key, move |value| render(&target, Some(value)))?;
            bound.push(key);
        }
        debug!(component = %scope.name, keys = ?bound, "bound store keys");
        Ok(json!({ "bound": bound }))
    };
    let life = Lifecycle::new().on_close(move || {
        debug!(component = %name, "unbinding");
        Ok(())
    });
    Ok(Logic::immediate(open).with_life(life))
}

fn render(node: &Node, value: Option<&Value>) {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    node.clear_children();
    if !text.is_empty() {
        node.append_child(&Node::text(&text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_formats_values() {
        let node = Node::element("span");
        render(&node, Some(&json!("guest")));
        assert_eq!(node.text_content(), "guest");
        render(&node, Some(&json!(3)));
        assert_eq!(node.text_content(), "3");
        render(&node, None);
        assert_eq!(node.child_count(), 0);
    }
}

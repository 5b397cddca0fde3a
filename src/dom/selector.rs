//! Selector subset used by component query helpers.
//!
//! Supported: type (`p`, `*`), `#id`, `.class`, `[attr]`, `[attr=value]`,
//! compounds of those, the descendant combinator (whitespace) and
//! comma-separated groups.

use super::Node;

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    groups: Vec<Vec<Compound>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    pub fn parse(input: &str) -> Option<Self> {
        let mut groups = Vec::new();
        for group in input.split(',') {
            let compounds = split_compounds(group)?
                .iter()
                .map(|part| parse_compound(part))
                .collect::<Option<Vec<_>>>()?;
            if compounds.is_empty() {
                return None;
            }
            groups.push(compounds);
        }
        Some(Selector { groups })
    }

    /// Whether `node` matches, with ancestor constraints resolved strictly
    /// inside `scope`.
    pub fn matches_within(&self, node: &Node, scope: &Node) -> bool {
        self.groups.iter().any(|chain| chain_matches(chain, node, scope))
    }
}

fn chain_matches(chain: &[Compound], node: &Node, scope: &Node) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(node) {
        return false;
    }
    let mut current = node.parent();
    for compound in ancestors.iter().rev() {
        loop {
            let Some(candidate) = current.take() else {
                return false;
            };
            if candidate == *scope {
                return false;
            }
            let hit = compound.matches(&candidate);
            current = candidate.parent();
            if hit {
                break;
            }
        }
    }
    true
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        let Some(tag) = node.tag() else {
            return false;
        };
        if let Some(wanted) = &self.tag {
            if *wanted != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| node.has_class(class)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match (node.attr(name), value) {
            (Some(actual), Some(expected)) => actual == *expected,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

/// Splits on whitespace outside of `[...]`.
fn split_compounds(group: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    for c in group.chars() {
        match c {
            '[' if !in_brackets => {
                in_brackets = true;
                current.push(c);
            }
            ']' if in_brackets => {
                in_brackets = false;
                current.push(c);
            }
            c if c.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_brackets {
        return None;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    Some(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(part: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = part;

    let tag_len = rest.find(|c: char| !is_ident_char(c) && c != '*').unwrap_or(rest.len());
    if tag_len > 0 {
        let tag = &rest[..tag_len];
        if tag != "*" {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_len..];
    }

    while let Some(c) = rest.chars().next() {
        match c {
            '#' | '.' => {
                let body = &rest[1..];
                let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
                if len == 0 {
                    return None;
                }
                let ident = body[..len].to_string();
                if c == '#' {
                    compound.id = Some(ident);
                } else {
                    compound.classes.push(ident);
                }
                rest = &body[len..];
            }
            '[' => {
                let end = rest.find(']')?;
                let inner = rest[1..end].trim();
                let attr = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                        (name.trim().to_ascii_lowercase(), Some(value.to_string()))
                    }
                    None => (inner.to_ascii_lowercase(), None),
                };
                if attr.0.is_empty() {
                    return None;
                }
                compound.attrs.push(attr);
                rest = &rest[end + 1..];
            }
            _ => return None,
        }
    }
    Some(compound)
}

#[cfg(test)]
mod tests {
    use crate::dom::{parse_fragment, Node};

    fn page() -> Node {
        let mount = Node::element("div").with_attr("id", "mount-main");
        let nodes = parse_fragment(
            r#"<main name="home">
                 <form id="login"><input name="user"><button class="btn primary">Go</button></form>
                 <p class="btn">x</p>
               </main>"#,
        );
        mount.append_child(&nodes[0]);
        mount
    }

    #[test]
    fn matches_simple_selectors() {
        let mount = page();
        assert_eq!(mount.query_all(".btn").len(), 2);
        assert_eq!(mount.query_all("button.btn.primary").len(), 1);
        assert_eq!(mount.query_all("#login").len(), 1);
        assert_eq!(mount.query_all("[name=user]").len(), 1);
        assert_eq!(mount.query_all("[name]").len(), 2);
        assert_eq!(mount.query_all("*").len(), 5);
    }

    #[test]
    fn descendant_combinator_and_groups() {
        let mount = page();
        assert_eq!(mount.query_all("form .btn").len(), 1);
        assert_eq!(mount.query_all("main p").len(), 1);
        assert_eq!(mount.query_all("form p").len(), 0);
        assert_eq!(mount.query_all("input, p").len(), 2);
    }

    #[test]
    fn ancestors_outside_scope_do_not_count() {
        let mount = page();
        let form = mount.query("#login").unwrap();
        assert_eq!(form.query_all("main button").len(), 0);
        assert_eq!(form.query_all("button").len(), 1);
    }

    #[test]
    fn invalid_selectors_match_nothing() {
        let mount = page();
        assert!(mount.query_all("[name").is_empty());
        assert!(mount.query_all("p > a").is_empty());
        assert!(mount.query_all("").is_empty());
    }
}

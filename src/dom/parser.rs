//! Tolerant markup parser.
//!
//! Accepts the HTML subset component templates use: elements, quoted and
//! bare attributes, void and self-closing tags, comments, text with the
//! common character references. Malformed input never fails; stray end
//! tags are ignored and unclosed elements close at end of input.

use super::Node;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parses `markup` into its top-level nodes, detached from any parent.
pub fn parse_fragment(markup: &str) -> Vec<Node> {
    let root = Node::element("#fragment");
    let mut stack = vec![root.clone()];
    let mut cursor = Cursor { src: markup, pos: 0 };

    while !cursor.at_end() {
        let rest = cursor.rest();
        if let Some(after) = rest.strip_prefix("<!--") {
            let skip = after.find("-->").map(|end| end + 3).unwrap_or(after.len());
            cursor.pos += 4 + skip;
        } else if rest.starts_with("</") {
            let end = rest.find('>').unwrap_or(rest.len());
            let name = rest[2..end].trim().to_ascii_lowercase();
            cursor.pos += (end + 1).min(rest.len());
            close_element(&mut stack, &name);
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            cursor.pos += end;
        } else if let Some(tag) = parse_start_tag(&mut cursor) {
            let element = Node::element(&tag.name);
            for (name, value) in &tag.attrs {
                element.set_attr(name, value);
            }
            top(&stack).append_child(&element);
            if !tag.self_closing && !is_void(&tag.name) {
                stack.push(element);
            }
        } else {
            // Plain text up to the next '<' (a lone '<' is text too).
            let rest = cursor.rest();
            let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            let len = rest[first..]
                .find('<')
                .map(|i| i + first)
                .unwrap_or(rest.len());
            push_text(&top(&stack), &decode_entities(&rest[..len]));
            cursor.pos += len;
        }
    }

    let nodes = root.children();
    root.clear_children();
    nodes
}

fn top(stack: &[Node]) -> Node {
    stack.last().cloned().unwrap_or_else(|| Node::element("#fragment"))
}

fn close_element(stack: &mut Vec<Node>, name: &str) {
    if let Some(index) = stack
        .iter()
        .rposition(|node| node.tag().as_deref() == Some(name))
    {
        if index > 0 {
            stack.truncate(index);
        }
    }
}

fn push_text(parent: &Node, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = parent.children().last() {
        if let super::NodeKind::Text(existing) = last.kind() {
            parent.remove_child(last);
            parent.append_child(&Node::text(&(existing + text)));
            return;
        }
    }
    parent.append_child(&Node::text(text));
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

/// Parses a start tag at the cursor. On failure the cursor is left where it
/// was and the caller treats the input as text.
fn parse_start_tag(cursor: &mut Cursor<'_>) -> Option<StartTag> {
    let start = cursor.pos;
    let mut rest = cursor.rest().chars();
    if rest.next() != Some('<') || !rest.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    cursor.bump();
    let name = cursor
        .eat_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':')
        .to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        cursor.skip_whitespace();
        let rest = cursor.rest();
        if rest.starts_with("/>") {
            cursor.pos += 2;
            return Some(StartTag { name, attrs, self_closing: true });
        }
        match cursor.peek() {
            None => {
                cursor.pos = start;
                return None;
            }
            Some('>') => {
                cursor.bump();
                return Some(StartTag { name, attrs, self_closing: false });
            }
            Some('/') => {
                cursor.bump();
                continue;
            }
            Some(_) => {}
        }

        let attr_name = cursor
            .eat_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
            .to_ascii_lowercase();
        if attr_name.is_empty() {
            cursor.bump();
            continue;
        }
        cursor.skip_whitespace();
        let value = if cursor.peek() == Some('=') {
            cursor.bump();
            cursor.skip_whitespace();
            match cursor.peek() {
                Some(quote @ ('"' | '\'')) => {
                    cursor.bump();
                    let value = cursor.eat_while(|c| c != quote).to_string();
                    cursor.bump();
                    value
                }
                _ => cursor
                    .eat_while(|c| !c.is_whitespace() && c != '>')
                    .to_string(),
            }
        } else {
            String::new()
        };
        attrs.push((attr_name, decode_entities(&value)));
    }
}

/// Decodes the named references templates commonly use plus numeric ones.
/// Unknown references are kept verbatim.
pub(crate) fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            c.map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;

    #[test]
    fn keeps_every_top_level_node() {
        let nodes = parse_fragment("<div name=\"a\"></div><div name=\"b\"></div>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].attr("name").as_deref(), Some("a"));
        assert!(nodes[1].parent().is_none());
    }

    #[test]
    fn parses_attribute_styles() {
        let nodes = parse_fragment(r#"<input type=text disabled value='a &lt; b' data-x = "1"/>"#);
        let input = &nodes[0];
        assert_eq!(input.attr("type").as_deref(), Some("text"));
        assert_eq!(input.attr("disabled").as_deref(), Some(""));
        assert_eq!(input.attr("value").as_deref(), Some("a < b"));
        assert_eq!(input.attr("data-x").as_deref(), Some("1"));
    }

    #[test]
    fn void_and_unclosed_elements() {
        let nodes = parse_fragment("<ul><li>one<li>two<br></ul>");
        assert_eq!(nodes.len(), 1);
        let items = nodes[0].query_all("li");
        assert_eq!(items.len(), 2);
        assert_eq!(nodes[0].text_content(), "onetwo");
    }

    #[test]
    fn comments_and_stray_end_tags_are_ignored() {
        let nodes = parse_fragment("<!-- lead --><p>x</span></p>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag().as_deref(), Some("p"));
        assert_eq!(nodes[0].text_content(), "x");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let nodes = parse_fragment("<p>1 < 2</p>");
        assert_eq!(nodes[0].text_content(), "1 < 2");
        assert_eq!(nodes[0].child_count(), 1);
    }

    #[test]
    fn leading_text_is_its_own_node() {
        let nodes = parse_fragment("hello <b>world</b>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].kind(), NodeKind::Text("hello ".into()));
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode_entities("&#65;&#x42;&unknown;"), "AB&unknown;");
    }
}

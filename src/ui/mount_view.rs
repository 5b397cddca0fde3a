use crate::app::state::AppState;
use crate::ui::theme::Theme;
use naive::dom::{Node, NodeKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match &state.component {
        Some(name) => format!(" {name} "),
        None => " (empty) ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border_focused())
        .style(Theme::panel());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.mount.child_count() == 0 {
        let empty = Paragraph::new("Nothing mounted. Type a route and press Enter, or /help.")
            .style(Theme::muted());
        frame.render_widget(empty, inner);
        return;
    }

    let lines = if state.show_markup {
        markup_lines(&state.mount)
    } else {
        page_lines(&state.mount)
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn markup_lines(mount: &Node) -> Vec<Line<'static>> {
    mount
        .children()
        .iter()
        .flat_map(|child| {
            child
                .to_markup()
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Theme::markup_tag())))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Lays out the mounted subtree as text, the way a browser would flow it.
pub fn page_lines(mount: &Node) -> Vec<Line<'static>> {
    let mut writer = PageWriter::default();
    for child in mount.children() {
        writer.visit(&child, Theme::text());
    }
    writer.finish()
}

#[derive(Default)]
struct PageWriter {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    prefix: Option<Span<'static>>,
}

impl PageWriter {
    fn break_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        spans.extend(self.prefix.take());
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn push(&mut self, text: String, style: Style) {
        if text.is_empty() {
            return;
        }
        self.current.push(Span::styled(text, style));
    }

    fn visit(&mut self, node: &Node, style: Style) {
        let (tag, attrs) = match node.kind() {
            NodeKind::Text(text) => {
                let at_line_start = self.current.is_empty();
                self.push(collapse(&text, at_line_start), style);
                return;
            }
            NodeKind::Element { tag, attrs } => (tag, attrs),
        };
        let attr = |name: &str| {
            attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
        };

        match tag.as_str() {
            "script" | "style" | "template" => return,
            "br" => {
                self.break_line();
                return;
            }
            "hr" => {
                self.break_line();
                self.lines
                    .push(Line::from(Span::styled("─".repeat(24), Theme::border())));
                return;
            }
            "input" | "textarea" => {
                let shown = attr("value")
                    .or_else(|| attr("placeholder"))
                    .unwrap_or_default();
                self.push(format!("[{shown:_<12}]"), Theme::link());
                return;
            }
            "img" => {
                let alt = attr("alt").unwrap_or_else(|| "image".to_string());
                self.push(format!("[{alt}]"), Theme::muted());
                return;
            }
            _ => {}
        }

        let block = BLOCK_TAGS.contains(&tag.as_str());
        if block {
            self.break_line();
        }

        let style = match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                self.prefix = Some(Span::styled(format!("{} ", "#".repeat(level)), Theme::heading()));
                Theme::heading()
            }
            "li" => {
                self.prefix = Some(Span::styled("  • ", Style::default().fg(Theme::ACCENT_AMBER)));
                style
            }
            "a" => Theme::link(),
            "strong" | "b" => style.add_modifier(Modifier::BOLD),
            "em" | "i" => style.add_modifier(Modifier::ITALIC),
            "code" => style.fg(Theme::ACCENT_LAVENDER),
            _ => style,
        };

        if tag == "button" {
            self.push("[ ".to_string(), Theme::link());
        }
        for child in node.children() {
            self.visit(&child, style);
        }
        if tag == "button" {
            self.push(" ]".to_string(), Theme::link());
        }

        if block {
            self.break_line();
            if matches!(tag.as_str(), "p" | "h1" | "h2" | "h3") {
                self.lines.push(Line::default());
            }
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.break_line();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Collapses whitespace runs to one space, dropping leading space at the
/// start of a line.
fn collapse(text: &str, at_line_start: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = text.starts_with(char::is_whitespace) && !at_line_start;
    for word in text.split_whitespace() {
        if pending_space {
            out.push(' ');
        }
        out.push_str(word);
        pending_space = true;
    }
    if !out.is_empty() && text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    if out.is_empty() && pending_space {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use naive::dom::parse_fragment;

    fn plain(mount: &Node) -> Vec<String> {
        page_lines(mount)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn mounted(markup: &str) -> Node {
        let mount = Node::element("div");
        for node in parse_fragment(markup) {
            mount.append_child(&node);
        }
        mount
    }

    #[test]
    fn blocks_break_lines_and_inline_text_flows() {
        let mount = mounted(
            "<section><h1>Welcome</h1><p>Hello   <b>guest</b>, you have\n 3 visits.</p></section>",
        );
        assert_eq!(
            plain(&mount),
            vec!["# Welcome", "", "Hello guest, you have 3 visits."]
        );
    }

    #[test]
    fn lists_controls_and_hidden_tags() {
        let mount = mounted(
            "<ul><li>one</li><li>two</li></ul><script>ignored()</script>\
             <button>Save</button><input placeholder=\"name\">",
        );
        assert_eq!(
            plain(&mount),
            vec!["  • one", "  • two", "[ Save ][name________]"]
        );
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(collapse("  a \n b  ", true), "a b ");
        assert_eq!(collapse("  a", false), " a");
        assert_eq!(collapse("   ", false), " ");
        assert_eq!(collapse("   ", true), "");
    }
}

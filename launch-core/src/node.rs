//! Reader and writer for the host's config-node text format.
//!
//! ```text
//! DB
//! {
//!     item
//!     {
//!         TurnAngle = 10
//!     }
//! }
//! ```
//!
//! Values are `key = value` lines, `//` starts a comment and value order is
//! not significant. Typed getters never fail: a missing or unparsable value
//! reads as zero / false.

use std::fmt;

use crate::error::{NodeError, NodeErrorKind};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub name: String,
    values: Vec<(String, String)>,
    nodes: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Sets `key`, replacing the first existing value with that key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((key.to_string(), value)),
        }
    }

    pub fn set_f64(&mut self, key: &str, value: f64) {
        // `{}` on f64 is the shortest text that parses back to the same bits.
        self.set(key, value.to_string());
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, if value { "True" } else { "False" });
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn f64_or_zero(&self, key: &str) -> f64 {
        self.get(key)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    pub fn bool_or_false(&self, key: &str) -> bool {
        self.get(key)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |node| node.name == name)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Renders this node's contents at top level, without its own header.
    pub fn to_document(&self) -> String {
        let mut out = String::new();
        self.write_body(&mut out, 0);
        out
    }

    fn write_body(&self, out: &mut String, depth: usize) {
        for (key, value) in &self.values {
            push_indent(out, depth);
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
        for node in &self.nodes {
            push_indent(out, depth);
            out.push_str(&node.name);
            out.push('\n');
            push_indent(out, depth);
            out.push_str("{\n");
            node.write_body(out, depth + 1);
            push_indent(out, depth);
            out.push_str("}\n");
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push_str("\n{\n");
        self.write_body(&mut out, 1);
        out.push_str("}\n");
        f.write_str(&out)
    }
}

/// Parses a whole document into an unnamed root node holding its top-level
/// values and nodes. A leading byte-order mark is skipped.
pub fn parse_document(text: &str) -> Result<Node, NodeError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    // (node, line its header was on)
    let mut stack: Vec<(Node, usize)> = vec![(Node::new(""), 0)];
    // Node name waiting for its opening brace.
    let mut pending: Option<(String, usize)> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let err = |kind| NodeError {
            line: line_no,
            kind,
        };

        if line == "{" {
            let (name, name_line) = pending
                .take()
                .ok_or_else(|| err(NodeErrorKind::UnexpectedOpenBrace))?;
            stack.push((Node::new(name), name_line));
            continue;
        }

        if let Some((_, name_line)) = &pending {
            return Err(err(NodeErrorKind::MissingOpenBrace {
                name_line: *name_line,
            }));
        }

        if line == "}" {
            if stack.len() == 1 {
                return Err(err(NodeErrorKind::UnexpectedCloseBrace));
            }
            if let Some((closed, _)) = stack.pop() {
                if let Some((parent, _)) = stack.last_mut() {
                    parent.add_node(closed);
                }
            }
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            if let Some((current, _)) = stack.last_mut() {
                current.values.push((key.trim().to_string(), value.trim().to_string()));
            }
            continue;
        }

        if let Some(name) = line.strip_suffix('{') {
            let name = name.trim();
            if name.is_empty() || name.contains(['{', '}']) {
                return Err(err(NodeErrorKind::StrayLine));
            }
            stack.push((Node::new(name), line_no));
            continue;
        }

        if line.contains(['{', '}']) {
            return Err(err(NodeErrorKind::StrayLine));
        }
        pending = Some((line.to_string(), line_no));
    }

    let last_line = text.lines().count().max(1);
    if let Some((_, name_line)) = pending {
        return Err(NodeError {
            line: last_line,
            kind: NodeErrorKind::MissingOpenBrace { name_line },
        });
    }
    if stack.len() > 1 {
        let name_line = stack.last().map(|(_, line)| *line).unwrap_or(0);
        return Err(NodeError {
            line: last_line,
            kind: NodeErrorKind::UnclosedNode { name_line },
        });
    }

    Ok(stack.pop().map(|(root, _)| root).unwrap_or_default())
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(at) => &line[..at],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_nodes_and_values() {
        let text = "\
DB
{
\titem
\t{
\t\tTurnAngle = 10
\t\tLaunchSuccess = True
\t}
\titem { // same-line brace
\t\tTurnAngle = 12.5
\t}
}
";
        let root = parse_document(text).unwrap();
        let db = root.node("DB").unwrap();
        let items: Vec<&Node> = db.nodes_named("item").collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].f64_or_zero("TurnAngle"), 10.0);
        assert!(items[0].bool_or_false("LaunchSuccess"));
        assert_eq!(items[1].f64_or_zero("TurnAngle"), 12.5);
    }

    #[test]
    fn rendered_document_parses_back() {
        let mut item = Node::new("item");
        item.set_f64("TurnAngle", 13.333333333333334);
        item.set_bool("LaunchSuccess", false);
        let mut db = Node::new("DB");
        db.add_node(item.clone());
        let mut root = Node::default();
        root.add_node(db);

        let text = root.to_document();
        assert!(text.starts_with("DB\n{\n\titem\n\t{\n"));
        let parsed = parse_document(&text).unwrap();
        assert_eq!(parsed.node("DB").unwrap().nodes()[0], item);
    }

    #[test]
    fn leading_byte_order_mark_is_skipped() {
        let text = "\u{feff}DB\n{\n\titem\n\t{\n\t\tTurnAngle = 10\n\t}\n}\n";
        let root = parse_document(text).unwrap();
        let db = root.node("DB").expect("DB node");
        assert_eq!(db.nodes_named("item").count(), 1);
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let root = parse_document("name = a=b\n").unwrap();
        assert_eq!(root.get("name"), Some("a=b"));
    }

    #[test]
    fn set_replaces_existing_value() {
        let mut node = Node::new("item");
        node.set("Roll", "1");
        node.set("Roll", "2");
        assert_eq!(node.values().count(), 1);
        assert_eq!(node.get("Roll"), Some("2"));
    }

    #[test]
    fn unbalanced_close_is_rejected() {
        let err = parse_document("DB\n{\n}\n}\n").unwrap_err();
        assert_eq!(err.line, 4);
        assert_eq!(err.kind, NodeErrorKind::UnexpectedCloseBrace);
    }

    #[test]
    fn unclosed_node_is_rejected() {
        let err = parse_document("DB\n{\n\titem\n\t{\n").unwrap_err();
        assert_eq!(err.kind, NodeErrorKind::UnclosedNode { name_line: 3 });
    }

    #[test]
    fn name_without_brace_is_rejected() {
        let err = parse_document("DB\nTurnAngle = 3\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, NodeErrorKind::MissingOpenBrace { name_line: 1 });
    }

    #[test]
    fn stray_brace_without_name_is_rejected() {
        let err = parse_document("{\n}\n").unwrap_err();
        assert_eq!(err.kind, NodeErrorKind::UnexpectedOpenBrace);
    }
}

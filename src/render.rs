//! Tag text for individual nodes
//!
//! The traversal engine builds its output from two pieces per node: the text
//! that opens it and the text that closes it. Escaping follows the HTML
//! serialization algorithm: text escapes `&`, `<`, `>` and no-break spaces,
//! attribute values escape `&`, `"` and no-break spaces, and text inside
//! raw-text elements is written back untouched.

use crate::dom::{Document, Node, NodeId, NodeKind};

/// HTML void elements; they never get a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Opening text of a node: the start tag, or the literal text/comment/directive
pub fn open_tag_text(node: &Node) -> String {
    match node.kind {
        NodeKind::Element => {
            let mut out = String::with_capacity(node.name.len() + 2 + node.attributes.len() * 16);
            out.push('<');
            out.push_str(&node.name);
            for (name, value) in node.attributes.iter() {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    escape_into(&mut out, value, true);
                    out.push('"');
                }
            }
            out.push('>');
            out
        }
        NodeKind::Text if node.raw => node.data.clone(),
        NodeKind::Text => {
            let mut out = String::with_capacity(node.data.len());
            escape_into(&mut out, &node.data, false);
            out
        }
        NodeKind::Comment => format!("<!--{}-->", node.data),
        NodeKind::Directive => format!("<!{}>", node.data),
    }
}

/// Closing text of a node; empty for void elements and non-elements
pub fn close_tag_text(node: &Node) -> String {
    if node.kind == NodeKind::Element && !VOID_ELEMENTS.contains(&node.name.as_str()) {
        format!("</{}>", node.name)
    } else {
        String::new()
    }
}

/// Serialize a document as-is, without applying any rewrite rules
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for id in doc.roots() {
        serialize_node(doc, *id, &mut out);
    }
    out
}

fn serialize_node(doc: &Document, id: NodeId, out: &mut String) {
    let node = doc.node(id);
    out.push_str(&open_tag_text(node));
    for child in node.children() {
        serialize_node(doc, *child, out);
    }
    out.push_str(&close_tag_text(node));
}

fn escape_into(out: &mut String, text: &str, attr_mode: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attr_mode => out.push_str("&quot;"),
            '<' if !attr_mode => out.push_str("&lt;"),
            '>' if !attr_mode => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

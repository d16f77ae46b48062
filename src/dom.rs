//! Arena-backed document tree
//!
//! Nodes live in a single `Vec<Node>` owned by a [`Document`] and refer to each
//! other through [`NodeId`] indices. Ownership is strictly top-down: children are
//! listed by index on their parent, and `parent` is a plain back-reference used
//! for upward lookups only. Rewrite rules change a node's fields in place, so an
//! id handed out once stays valid for the life of the document.

use std::slice;

/// Index of a node inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind of markup a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    /// Markup declarations such as `<!DOCTYPE html>`
    Directive,
}

/// Ordered attribute map
///
/// Keys are unique and keep their first insertion position, so serialization
/// is deterministic. Setting an existing key updates it where it stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// Value of `name` if present and non-empty
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let position = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}

/// One element, text run, comment or directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Tag name; empty for non-elements
    pub name: String,
    pub attributes: Attributes,
    /// Character data of text, comment and directive nodes
    pub data: String,
    /// Text emitted verbatim (content of raw-text elements like `iframe`)
    pub raw: bool,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn element(name: impl Into<String>, attributes: Attributes) -> Self {
        Self::new(NodeKind::Element, name.into(), attributes, String::new())
    }

    pub fn text(data: impl Into<String>) -> Self {
        Self::new(NodeKind::Text, String::new(), Attributes::new(), data.into())
    }

    pub fn raw_text(data: impl Into<String>) -> Self {
        Self {
            raw: true,
            ..Self::text(data)
        }
    }

    pub fn comment(data: impl Into<String>) -> Self {
        Self::new(NodeKind::Comment, String::new(), Attributes::new(), data.into())
    }

    pub fn directive(data: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Directive,
            String::new(),
            Attributes::new(),
            data.into(),
        )
    }

    fn new(kind: NodeKind, name: String, attributes: Attributes, data: String) -> Self {
        Self {
            kind,
            name,
            attributes,
            data,
            raw: false,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_element_named(&self, name: &str) -> bool {
        self.is_element() && self.name == name
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// A parsed document: an arena of nodes plus its top-level sequence
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            roots: Vec::new(),
        }
    }

    /// Append `node` as the last child of `parent`, or as a new root
    pub fn append(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Top-level nodes in document order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        self.node(id).parent.map(|parent| self.node(parent))
    }

    /// Detach every child of `id`; the detached nodes are never reattached
    pub fn clear_children(&mut self, id: NodeId) {
        self.nodes[id.0].children.clear();
    }

    /// Total nodes allocated, including detached ones
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// First descendant of `id` (excluding `id` itself) in document order
    /// matching `predicate`
    pub fn find_descendant<P>(&self, id: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if predicate(node) {
                return Some(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_attributes_keep_insertion_order() {
        let mut a = attrs(&[("src", "a.png"), ("alt", "x")]);
        a.set("width", "380");
        a.set("src", "b.png");

        let keys: Vec<_> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["src", "alt", "width"]);
        assert_eq!(a.get("src"), Some("b.png"));
    }

    #[test]
    fn test_attributes_remove_and_empty_values() {
        let mut a = attrs(&[("allowfullscreen", ""), ("frameborder", "0")]);
        assert!(a.contains("allowfullscreen"));
        assert_eq!(a.get_non_empty("allowfullscreen"), None);
        assert_eq!(a.remove("frameborder"), Some("0".to_string()));
        assert_eq!(a.remove("frameborder"), None);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_append_links_parent_and_children() {
        let mut doc = Document::new();
        let div = doc.append(None, Node::element("div", Attributes::new()));
        let text = doc.append(Some(div), Node::text("hi"));
        let p = doc.append(None, Node::element("p", Attributes::new()));

        assert_eq!(doc.roots(), &[div, p]);
        assert_eq!(doc.node(div).children(), &[text]);
        assert_eq!(doc.node(text).parent(), Some(div));
        assert!(doc.parent_of(text).is_some_and(|n| n.name == "div"));
        assert!(doc.parent_of(div).is_none());
    }

    #[test]
    fn test_find_descendant_is_document_order() {
        let mut doc = Document::new();
        let root = doc.append(None, Node::element("blockquote", Attributes::new()));
        let p = doc.append(Some(root), Node::element("p", Attributes::new()));
        let first = doc.append(Some(p), Node::element("a", attrs(&[("href", "1")])));
        let _second = doc.append(Some(root), Node::element("a", attrs(&[("href", "2")])));

        assert_eq!(doc.find_descendant(root, |n| n.name == "a"), Some(first));
        assert_eq!(doc.find_descendant(root, |n| n.name == "blockquote"), None);
    }

    #[test]
    fn test_clear_children_keeps_node_identity() {
        let mut doc = Document::new();
        let div = doc.append(None, Node::element("div", Attributes::new()));
        doc.append(Some(div), Node::text("gone"));
        doc.node_mut(div).name = "amp-facebook".to_string();
        doc.clear_children(div);

        assert!(doc.node(div).children().is_empty());
        assert!(doc.node(div).is_element_named("amp-facebook"));
        assert_eq!(doc.len(), 2);
    }
}

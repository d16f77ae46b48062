//! HTML5 parser using html5ever
//!
//! Markup is parsed with html5ever into an `RcDom` and then lowered into the
//! arena [`Document`] the rewrite engine mutates. html5ever implements the
//! WHATWG parsing algorithm, so malformed markup is repaired the way browsers
//! repair it instead of being rejected.
//!
//! # Fragments and documents
//!
//! Input whose first markup (after a BOM, whitespace and comments) is a doctype
//! or an `<html>` tag is parsed as a full document and keeps its
//! `html`/`head`/`body` skeleton. Anything else is a fragment (a blog post
//! body, say) and goes through the fragment algorithm with a `template`
//! context, which accepts any content model. The lowered roots then mirror the
//! top level of the input, table rows and leading whitespace included.
//!
//! # Examples
//!
//! ```rust
//! use amperize::parser::parse_html;
//!
//! let doc = parse_html("<p>Hello</p><img src=\"a.png\">").expect("parsed");
//! assert_eq!(doc.roots().len(), 2);
//! assert_eq!(doc.node(doc.roots()[1]).name, "img");
//! ```

use html5ever::tendril::TendrilSink;
use html5ever::{QualName, local_name, ns, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::dom::{Attributes, Document, Node, NodeId};
use crate::error::AmperizeError;
use crate::filter::ElementFilter;

/// Elements whose text content html5ever does not decode
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe",
    "noembed",
    "noframes",
    "noscript",
    "plaintext",
    "script",
    "style",
    "xmp",
];

/// Parse markup into a document with the default nesting limit
///
/// # Errors
///
/// Returns `AmperizeError::ParseError` if the document nests deeper than the
/// default limit.
pub fn parse_html(html: &str) -> Result<Document, AmperizeError> {
    parse_html_with_filter(html, &ElementFilter::new())
}

/// Parse markup into a document, enforcing the filter's nesting limit
///
/// Empty and whitespace-only input yields an empty document.
///
/// # Errors
///
/// Returns `AmperizeError::ParseError` if an element nests deeper than
/// `filter.max_depth()`.
pub fn parse_html_with_filter(
    html: &str,
    filter: &ElementFilter,
) -> Result<Document, AmperizeError> {
    if html.trim().is_empty() {
        return Ok(Document::new());
    }

    let full_document = is_full_document(html);
    let mut lowering = Lowering {
        doc: Document::with_capacity(html.len() / 16),
        filter,
    };

    if full_document {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        lowering.lower_children(&dom.document, None, 0)?;
    } else {
        let dom = parse_fragment(
            RcDom::default(),
            Default::default(),
            QualName::new(None, ns!(html), local_name!("template")),
            Vec::new(),
            true,
        )
        .one(html);
        // The fragment algorithm hangs its output off a synthetic `html` root
        let root = dom.document.children.borrow().first().cloned();
        if let Some(root) = root {
            lowering.lower_children(&root, None, 0)?;
        }
    }

    tracing::debug!(
        nodes = lowering.doc.len(),
        roots = lowering.doc.roots().len(),
        full_document,
        "parsed HTML"
    );

    Ok(lowering.doc)
}

fn is_full_document(html: &str) -> bool {
    let mut rest = html.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        match rest.strip_prefix("<!--") {
            Some(comment) => match comment.find("-->") {
                Some(end) => rest = &comment[end + 3..],
                None => return false,
            },
            None => break,
        }
    }

    let head = rest.get(..9).unwrap_or(rest).to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

struct Lowering<'f> {
    doc: Document,
    filter: &'f ElementFilter,
}

impl Lowering<'_> {
    fn lower_children(
        &mut self,
        handle: &Handle,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<(), AmperizeError> {
        for child in handle.children.borrow().iter() {
            self.lower_node(child, parent, depth)?;
        }
        Ok(())
    }

    fn lower_node(
        &mut self,
        handle: &Handle,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<(), AmperizeError> {
        match handle.data {
            NodeData::Document => self.lower_children(handle, parent, depth)?,
            NodeData::Doctype { ref name, .. } => {
                let data = if name.is_empty() {
                    "DOCTYPE".to_string()
                } else {
                    format!("DOCTYPE {}", name)
                };
                self.doc.append(parent, Node::directive(data));
            }
            NodeData::Text { ref contents } => {
                let text = contents.borrow().to_string();
                let raw = parent.is_some_and(|id| {
                    RAW_TEXT_ELEMENTS.contains(&self.doc.node(id).name.as_str())
                });
                let node = if raw {
                    Node::raw_text(text)
                } else {
                    Node::text(text)
                };
                self.doc.append(parent, node);
            }
            NodeData::Comment { ref contents } => {
                self.doc.append(parent, Node::comment(contents.to_string()));
            }
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let tag_name = name.local.as_ref();
                self.filter
                    .validate_depth(depth + 1)
                    .map_err(AmperizeError::ParseError)?;

                let attributes: Attributes = attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attribute_name(&attr.name), attr.value.to_string()))
                    .collect();
                let id = self.doc.append(parent, Node::element(tag_name, attributes));
                self.lower_children(handle, Some(id), depth + 1)?;
            }
            NodeData::ProcessingInstruction { .. } => {
                // The HTML tokenizer turns `<?...>` into comments; nothing reaches here
            }
        }

        Ok(())
    }
}

fn attribute_name(name: &QualName) -> String {
    match name.prefix {
        Some(ref prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

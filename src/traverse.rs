//! Traversal engine - rewrites a document tree and folds it into AMP markup
//!
//! The engine walks the tree in document order. For every node it
//!
//! 1. skips suppressed elements (`style`, `script`, `textarea`, `link`) along
//!    with their whole subtree,
//! 2. applies the rewrite rule set, which may rename the node, replace its
//!    attributes or drop its children,
//! 3. appends the node's opening text,
//! 4. renders its (possibly emptied) children,
//! 5. appends the node's closing text.
//!
//! Output for a subtree is always open tag + children in document order +
//! close tag, so sibling text and elements keep their relative order no
//! matter how many of them are rewritten or dropped.
//!
//! # Scheduling
//!
//! Descending into a node's children is a suspension point: the engine yields
//! once before each descent so other work on the same executor (another
//! conversion, I/O) can run between tree levels. Siblings at one level are
//! processed without interruption. Nothing is spawned; the yield only affects
//! interleaving, never the output.
//!
//! The yield wakes its own task before returning `Pending`, so it makes
//! progress under any executor, including `futures::executor::block_on`
//! running on a thread that already hosts a tokio runtime.

use futures::future::{BoxFuture, poll_fn};
use std::task::Poll;
use std::time::{Duration, Instant};

use crate::config::{AmperizeConfig, ExtractionPolicy};
use crate::dom::{Document, NodeId};
use crate::error::AmperizeError;
use crate::filter::{ElementFilter, FilterAction};
use crate::render::{close_tag_text, open_tag_text};
use crate::rules::apply_rules;

/// Per-call bookkeeping for one traversal
///
/// Each conversion owns its own context, so concurrent conversions on one
/// engine never share mutable state.
#[derive(Debug)]
pub struct TraversalContext {
    /// Start time of traversal
    start_time: Instant,
    /// Number of nodes visited
    node_count: u32,
    /// Number of elements changed by a rewrite rule
    rewritten_count: u32,
    /// Number of suppressed subtrees
    suppressed_count: u32,
    /// Number of embeds left alone after an extraction failure
    skipped_count: u32,
}

impl TraversalContext {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            node_count: 0,
            rewritten_count: 0,
            suppressed_count: 0,
            skipped_count: 0,
        }
    }

    /// Elapsed time since traversal started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Number of nodes visited so far, suppressed roots included
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn rewritten_count(&self) -> u32 {
        self.rewritten_count
    }

    pub fn suppressed_count(&self) -> u32 {
        self.suppressed_count
    }

    pub fn skipped_count(&self) -> u32 {
        self.skipped_count
    }
}

impl Default for TraversalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites documents according to a shared, read-only configuration
#[derive(Debug, Clone)]
pub struct Traverser<'c> {
    config: &'c AmperizeConfig,
    filter: ElementFilter,
}

impl<'c> Traverser<'c> {
    pub fn new(config: &'c AmperizeConfig) -> Self {
        Self {
            config,
            filter: ElementFilter::with_max_depth(config.max_depth),
        }
    }

    /// Rewrite and serialize a whole document
    ///
    /// # Errors
    ///
    /// Returns `AmperizeError::ExtractionError` when an embed lacks the data its
    /// rule needs and the configured policy is `ExtractionPolicy::Abort`.
    pub async fn render_document(
        &self,
        doc: &mut Document,
        ctx: &mut TraversalContext,
    ) -> Result<String, AmperizeError> {
        let roots = doc.roots().to_vec();
        let html = self.render(doc, roots, String::new(), ctx).await?;

        tracing::debug!(
            nodes = ctx.node_count(),
            rewritten = ctx.rewritten_count(),
            suppressed = ctx.suppressed_count(),
            skipped = ctx.skipped_count(),
            elapsed_us = ctx.elapsed().as_micros() as u64,
            "traversal complete"
        );

        Ok(html)
    }

    /// Render `nodes` in order, appending to `html`
    ///
    /// Children are rendered by a recursive call after a cooperative yield;
    /// the returned string is the accumulator with every node's output added.
    pub fn render<'a>(
        &'a self,
        doc: &'a mut Document,
        nodes: Vec<NodeId>,
        html: String,
        ctx: &'a mut TraversalContext,
    ) -> BoxFuture<'a, Result<String, AmperizeError>> {
        Box::pin(async move {
            let mut html = html;

            for id in nodes {
                ctx.node_count += 1;

                let node = doc.node(id);
                if node.is_element() && self.filter.check_element(&node.name) == FilterAction::Suppress
                {
                    tracing::trace!(element = %node.name, "suppressed element");
                    ctx.suppressed_count += 1;
                    continue;
                }

                self.rewrite(doc, id, ctx)?;

                let node = doc.node(id);
                html.push_str(&open_tag_text(node));

                let children = node.children().to_vec();
                if !children.is_empty() {
                    yield_now().await;
                    html = self.render(doc, children, html, ctx).await?;
                }

                html.push_str(&close_tag_text(doc.node(id)));
            }

            Ok(html)
        })
    }

    fn rewrite(
        &self,
        doc: &mut Document,
        id: NodeId,
        ctx: &mut TraversalContext,
    ) -> Result<(), AmperizeError> {
        let source_name = doc.node(id).name.clone();

        match apply_rules(doc, id, self.config) {
            Ok(true) => {
                ctx.rewritten_count += 1;
                tracing::trace!(from = %source_name, to = %doc.node(id).name, "rewrote element");
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(AmperizeError::ExtractionError(reason))
                if self.config.extraction_policy == ExtractionPolicy::Skip =>
            {
                ctx.skipped_count += 1;
                tracing::warn!(element = %source_name, %reason, "left embed unrewritten");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Suspend once, waking the current task immediately
async fn yield_now() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

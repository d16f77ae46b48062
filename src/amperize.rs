//! Conversion façade
//!
//! [`Amperize`] is the one-shot entry point: markup in, AMP markup out. The
//! engine holds only its static configuration; the parsed tree and output
//! accumulator of each call live inside that call, so any number of
//! conversions can run concurrently against one instance.
//!
//! Every call is tagged with a fresh correlation id that appears on the
//! `amperize` tracing span, which keeps the log lines of interleaved
//! conversions apart.
//!
//! # Examples
//!
//! ```rust
//! use amperize::Amperize;
//!
//! let amperize = Amperize::new();
//! let amp = amperize
//!     .parse_blocking("<img src=\"https://example.com/cat.gif\">")
//!     .expect("conversion failed");
//! assert_eq!(
//!     amp,
//!     "<amp-anim src=\"https://example.com/cat.gif\" width=\"380\" height=\"280\" layout=\"responsive\"></amp-anim>"
//! );
//! ```

use tracing::Instrument;
use uuid::Uuid;

use crate::config::AmperizeConfig;
use crate::error::AmperizeError;
use crate::filter::ElementFilter;
use crate::parser::parse_html_with_filter;
use crate::traverse::{TraversalContext, Traverser};

/// HTML to AMP-HTML converter
#[derive(Debug, Clone, Default)]
pub struct Amperize {
    config: AmperizeConfig,
}

impl Amperize {
    /// Create a converter with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with a custom configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use amperize::{Amperize, AmperizeConfig};
    ///
    /// let config = AmperizeConfig::from_json(r#"{"amp-img": {"width": 600, "height": 400}}"#)
    ///     .expect("valid configuration");
    /// let amperize = Amperize::with_config(config);
    /// let amp = amperize.parse_blocking("<img src=\"a.png\">").expect("converted");
    /// assert!(amp.contains("width=\"600\""));
    /// ```
    pub fn with_config(config: AmperizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AmperizeConfig {
        &self.config
    }

    /// Convert markup to AMP-HTML
    ///
    /// # Errors
    ///
    /// - `AmperizeError::ParseError` if the markup nests deeper than the
    ///   configured `max_depth`
    /// - `AmperizeError::ExtractionError` if an Instagram or Twitter embed lacks
    ///   its permalink or status link and the extraction policy is `Abort`
    pub async fn parse(&self, content: &str) -> Result<String, AmperizeError> {
        let id = Uuid::new_v4();
        let span = tracing::debug_span!("amperize", %id);
        self.convert(content).instrument(span).await
    }

    /// Convert markup and hand the outcome to `callback`
    ///
    /// The callback is invoked exactly once, with either the AMP markup or the
    /// error that prevented it.
    ///
    /// # Errors
    ///
    /// Returns `AmperizeError::UsageError` without parsing anything when no
    /// callback is supplied.
    pub async fn parse_with<F>(&self, content: &str, callback: Option<F>) -> Result<(), AmperizeError>
    where
        F: FnOnce(Result<String, AmperizeError>),
    {
        let Some(callback) = callback else {
            return Err(AmperizeError::UsageError(
                "No callback provided".to_string(),
            ));
        };

        callback(self.parse(content).await);
        Ok(())
    }

    /// Convert markup, blocking the current thread until done
    pub fn parse_blocking(&self, content: &str) -> Result<String, AmperizeError> {
        futures::executor::block_on(self.parse(content))
    }

    async fn convert(&self, content: &str) -> Result<String, AmperizeError> {
        let filter = ElementFilter::with_max_depth(self.config.max_depth);
        let mut doc = parse_html_with_filter(content, &filter)?;

        let mut ctx = TraversalContext::new();
        let result = Traverser::new(&self.config)
            .render_document(&mut doc, &mut ctx)
            .await;

        match result {
            Ok(html) => {
                tracing::debug!(input_len = content.len(), output_len = html.len(), "converted");
                Ok(html)
            }
            Err(err) => {
                tracing::debug!(error = %err, "conversion failed");
                Err(err)
            }
        }
    }
}

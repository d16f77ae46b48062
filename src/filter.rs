//! Element suppression and nesting limits
//!
//! AMP pages may not carry author scripts, inline styles, stylesheet links or
//! form text areas, so those elements are dropped together with everything
//! nested inside them. The filter also bounds document nesting depth so that
//! pathological input cannot exhaust the stack during lowering.

use crate::config::DEFAULT_MAX_DEPTH;

/// Elements removed from the output along with their subtree
const SUPPRESSED_ELEMENTS: &[&str] = &["style", "script", "textarea", "link"];

/// What to do with an element during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Rewrite and emit the element
    Keep,
    /// Skip the element and all of its children
    Suppress,
}

/// Decides which elements survive conversion
#[derive(Debug, Clone)]
pub struct ElementFilter {
    /// Maximum allowed nesting depth
    max_depth: usize,
}

impl ElementFilter {
    /// Create a filter with the default nesting limit
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a filter with a custom nesting limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Check whether an element is emitted
    ///
    /// # Examples
    ///
    /// ```
    /// use amperize::filter::{ElementFilter, FilterAction};
    ///
    /// let filter = ElementFilter::new();
    /// assert_eq!(filter.check_element("script"), FilterAction::Suppress);
    /// assert_eq!(filter.check_element("div"), FilterAction::Keep);
    /// ```
    pub fn check_element(&self, tag_name: &str) -> FilterAction {
        if SUPPRESSED_ELEMENTS.contains(&tag_name) {
            FilterAction::Suppress
        } else {
            FilterAction::Keep
        }
    }

    /// Validate nesting depth to prevent stack overflow
    ///
    /// # Examples
    ///
    /// ```
    /// use amperize::filter::ElementFilter;
    ///
    /// let filter = ElementFilter::with_max_depth(100);
    /// assert!(filter.validate_depth(50).is_ok());
    /// assert!(filter.validate_depth(150).is_err());
    /// ```
    pub fn validate_depth(&self, depth: usize) -> Result<(), String> {
        if depth > self.max_depth {
            Err(format!(
                "HTML nesting depth {} exceeds maximum allowed depth {}",
                depth, self.max_depth
            ))
        } else {
            Ok(())
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ElementFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppressed_elements() {
        let filter = ElementFilter::new();

        assert_eq!(filter.check_element("style"), FilterAction::Suppress);
        assert_eq!(filter.check_element("script"), FilterAction::Suppress);
        assert_eq!(filter.check_element("textarea"), FilterAction::Suppress);
        assert_eq!(filter.check_element("link"), FilterAction::Suppress);

        assert_eq!(filter.check_element("div"), FilterAction::Keep);
        assert_eq!(filter.check_element("iframe"), FilterAction::Keep);
        assert_eq!(filter.check_element("amp-img"), FilterAction::Keep);
    }

    #[test]
    fn test_suppression_is_exact_match() {
        let filter = ElementFilter::new();
        assert_eq!(filter.check_element("noscript"), FilterAction::Keep);
        assert_eq!(filter.check_element("amp-link"), FilterAction::Keep);
        assert_eq!(filter.check_element("SCRIPT"), FilterAction::Keep);
    }

    #[test]
    fn test_depth_validation() {
        let filter = ElementFilter::with_max_depth(100);

        assert!(filter.validate_depth(50).is_ok());
        assert!(filter.validate_depth(100).is_ok());
        assert!(filter.validate_depth(101).is_err());
        assert_eq!(ElementFilter::new().max_depth(), DEFAULT_MAX_DEPTH);
    }
}

//! Attribute normalizers shared by several rewrite rules
//!
//! Both helpers are best-effort: when they cannot improve a value they leave it
//! alone, and the AMP validator downstream has the final word.

use crate::config::{Layout, TagDefaults};
use crate::dom::Attributes;

/// Widths below this get `layout="fixed"`; stretching them looks wrong
pub const FIXED_LAYOUT_MAX_WIDTH: f64 = 300.0;

/// Force the `src` attribute onto `https`
///
/// `http://` is replaced in place and protocol-relative `//host/...` URLs
/// (common in embed snippets) get an `https:` prefix. Anything else, relative
/// paths included, is left unchanged.
///
/// Returns `true` if the attribute was rewritten.
///
/// # Examples
///
/// ```
/// use amperize::dom::Attributes;
/// use amperize::normalize::use_secure_schema;
///
/// let mut attrs: Attributes = [("src", "//giphy.com/embed/x")].into_iter().collect();
/// assert!(use_secure_schema(&mut attrs));
/// assert_eq!(attrs.get("src"), Some("https://giphy.com/embed/x"));
/// ```
pub fn use_secure_schema(attrs: &mut Attributes) -> bool {
    let Some(src) = attrs.get_non_empty("src") else {
        return false;
    };
    if src.starts_with("https://") {
        return false;
    }

    let secured = if let Some(rest) = src.strip_prefix("http://") {
        format!("https://{}", rest)
    } else if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        return false;
    };

    attrs.set("src", secured);
    true
}

/// Choose the `layout` attribute for an element that has none
///
/// An existing non-empty `layout` wins. Otherwise an element whose declared
/// width is numerically below 300 is `fixed`, and everything else takes the
/// tag's configured default layout.
pub fn set_layout_attribute(attrs: &mut Attributes, defaults: &TagDefaults) {
    if attrs.get_non_empty("layout").is_some() {
        return;
    }

    let layout = if declared_width(attrs).is_some_and(|width| width < FIXED_LAYOUT_MAX_WIDTH) {
        Layout::Fixed
    } else {
        defaults.layout
    };
    attrs.set("layout", layout.as_str());
}

fn declared_width(attrs: &Attributes) -> Option<f64> {
    attrs.get("width")?.trim().parse::<f64>().ok()
}

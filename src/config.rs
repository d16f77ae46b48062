//! Construction-time configuration
//!
//! Every AMP element the rule set produces carries a default attribute bundle
//! (`layout`, `width`, `height` and, for `amp-iframe`, `sandbox`). Callers
//! override individual fields; anything they leave out keeps its default.
//!
//! # Examples
//!
//! ```rust
//! use amperize::config::{AmperizeConfig, Layout};
//!
//! let config = AmperizeConfig::from_json(r#"{"amp-img": {"width": 600}}"#)
//!     .expect("valid configuration");
//!
//! let img = config.tag("amp-img");
//! assert_eq!(img.width, 600);
//! assert_eq!(img.height, 280);
//! assert_eq!(img.layout, Layout::Responsive);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::AmperizeError;

/// Default width forced onto rewritten media elements
pub const DEFAULT_WIDTH: u32 = 380;

/// Default height forced onto rewritten media elements
pub const DEFAULT_HEIGHT: u32 = 280;

/// Sandbox applied to `amp-iframe` elements that declare none
pub const DEFAULT_IFRAME_SANDBOX: &str = "allow-scripts allow-same-origin";

/// Default pass-through request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Maximum allowed nesting depth for parsed documents
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Bundle used for AMP tags with no configured defaults
static FALLBACK_DEFAULTS: TagDefaults = TagDefaults {
    layout: Layout::Responsive,
    width: DEFAULT_WIDTH,
    height: DEFAULT_HEIGHT,
    sandbox: None,
};

/// AMP layout keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Responsive,
    Fixed,
    FixedHeight,
    Fill,
    Container,
    FlexItem,
    Intrinsic,
    Nodisplay,
}

impl Layout {
    /// Attribute value as written into markup
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Responsive => "responsive",
            Layout::Fixed => "fixed",
            Layout::FixedHeight => "fixed-height",
            Layout::Fill => "fill",
            Layout::Container => "container",
            Layout::FlexItem => "flex-item",
            Layout::Intrinsic => "intrinsic",
            Layout::Nodisplay => "nodisplay",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default attributes for one AMP tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDefaults {
    pub layout: Layout,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<String>,
}

impl TagDefaults {
    /// Responsive bundle with the given dimensions
    pub fn responsive(width: u32, height: u32) -> Self {
        Self {
            layout: Layout::Responsive,
            width,
            height,
            sandbox: None,
        }
    }

    fn apply(&mut self, overrides: TagOverrides) {
        if let Some(layout) = overrides.layout {
            self.layout = layout;
        }
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if overrides.sandbox.is_some() {
            self.sandbox = overrides.sandbox;
        }
    }
}

/// How the engine reacts when an embed lacks the data its rule extracts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPolicy {
    /// Fail the whole conversion
    #[default]
    Abort,
    /// Leave the element unrewritten and keep going
    Skip,
}

/// Partial bundle; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagOverrides {
    pub layout: Option<Layout>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sandbox: Option<String>,
}

/// Caller-supplied configuration, merged over the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigOverrides {
    /// Request timeout in milliseconds
    pub request_timeout: Option<u64>,
    pub extraction_policy: Option<ExtractionPolicy>,
    pub max_depth: Option<usize>,
    /// Per-tag bundles keyed by AMP tag name (`amp-img`, `amp-iframe`, ...)
    #[serde(flatten)]
    pub tags: BTreeMap<String, TagOverrides>,
}

/// Static engine configuration shared by every conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmperizeConfig {
    tags: BTreeMap<String, TagDefaults>,
    /// Pass-through value for downstream consumers; the engine never enforces it
    pub request_timeout: Duration,
    pub extraction_policy: ExtractionPolicy,
    pub max_depth: usize,
}

impl Default for AmperizeConfig {
    fn default() -> Self {
        let mut tags = BTreeMap::new();
        for name in [
            "amp-img",
            "amp-anim",
            "amp-youtube",
            "amp-facebook",
            "amp-instagram",
            "amp-twitter",
        ] {
            tags.insert(
                name.to_string(),
                TagDefaults::responsive(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            );
        }
        tags.insert(
            "amp-iframe".to_string(),
            TagDefaults {
                sandbox: Some(DEFAULT_IFRAME_SANDBOX.to_string()),
                ..TagDefaults::responsive(DEFAULT_WIDTH, DEFAULT_HEIGHT)
            },
        );

        Self {
            tags,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            extraction_policy: ExtractionPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AmperizeConfig {
    /// Default configuration with `overrides` merged on top
    pub fn with_overrides(overrides: ConfigOverrides) -> Self {
        let mut config = Self::default();
        config.merge(overrides);
        config
    }

    /// Decode a JSON override document and merge it over the defaults
    ///
    /// # Errors
    ///
    /// Returns `AmperizeError::InvalidConfig` if the document is malformed or
    /// names an unknown layout.
    pub fn from_json(json: &str) -> Result<Self, AmperizeError> {
        let overrides: ConfigOverrides = serde_json::from_str(json)?;
        Ok(Self::with_overrides(overrides))
    }

    /// Merge overrides into this configuration; the caller's values win
    pub fn merge(&mut self, overrides: ConfigOverrides) {
        if let Some(ms) = overrides.request_timeout {
            self.request_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = overrides.extraction_policy {
            self.extraction_policy = policy;
        }
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = max_depth;
        }
        for (name, tag) in overrides.tags {
            self.tags
                .entry(name)
                .or_insert_with(|| FALLBACK_DEFAULTS.clone())
                .apply(tag);
        }
    }

    /// Replace the bundle for one AMP tag
    pub fn set_tag(&mut self, name: impl Into<String>, defaults: TagDefaults) {
        self.tags.insert(name.into(), defaults);
    }

    /// Bundle for `name`, or the responsive 380x280 fallback
    pub fn tag(&self, name: &str) -> &TagDefaults {
        self.tags.get(name).unwrap_or(&FALLBACK_DEFAULTS)
    }

    /// Names of all configured AMP tags
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }
}

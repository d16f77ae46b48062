//! Amperize - HTML to AMP-HTML rewriting engine
//!
//! This library rewrites ordinary HTML into markup that satisfies the AMP
//! custom-element requirements: images, iframes, audio and social embeds are
//! replaced by their `amp-*` equivalents, attributes AMP insists on are filled
//! in, and elements AMP forbids are dropped.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `amperize`: the conversion façade (`Amperize::parse`)
//! - `parser`: HTML5 parsing using html5ever, lowered into an arena tree
//! - `dom`: the arena document the rewrite engine mutates
//! - `traverse`: document-order traversal that rewrites and serializes
//! - `rules`: per-tag rewrite rules
//! - `normalize`: secure-scheme and layout helpers shared by the rules
//! - `filter`: suppressed elements and nesting limits
//! - `render`: open/close tag text for single nodes
//! - `config`: per-tag default attribute bundles and engine options
//!
//! # Example
//!
//! ```rust
//! use amperize::Amperize;
//!
//! let amperize = Amperize::new();
//! let amp = amperize
//!     .parse_blocking("<iframe src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\"></iframe>")
//!     .expect("conversion failed");
//! assert!(amp.contains("<amp-youtube data-videoid=\"dQw4w9WgXcQ\""));
//! ```

// Module declarations
pub mod amperize;
pub mod config;
pub mod dom;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod rules;
pub mod traverse;

// Re-export main types for convenience
pub use amperize::Amperize;
pub use config::{AmperizeConfig, ExtractionPolicy, Layout, TagDefaults};
pub use error::AmperizeError;
pub use parser::parse_html;

//! Rewrite rules: native elements to their AMP equivalents
//!
//! Rules are looked up by tag name in [`RULES`]. Each rule receives the whole
//! document so it can read its parent or search its descendants, but it only
//! ever mutates the node it was given. Rules that extract embedded data
//! (Instagram shortcodes, tweet ids) do all of their extraction before the
//! first mutation, so a failed rule leaves the node exactly as it found it.
//!
//! | Source | Target |
//! |---|---|
//! | `img` | `amp-anim` for `.gif` sources, otherwise `amp-img` |
//! | `iframe` with a YouTube `src` | `amp-youtube` |
//! | `iframe` with any other `src` | `amp-iframe` |
//! | `audio` | `amp-audio` |
//! | `div.fb-video`, `div.fb-post` | `amp-facebook` |
//! | `blockquote.instagram-media` | `amp-instagram` |
//! | `blockquote.twitter-tweet` | `amp-twitter` |

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::config::{AmperizeConfig, TagDefaults};
use crate::dom::{Attributes, Document, NodeId};
use crate::error::AmperizeError;
use crate::normalize::{set_layout_attribute, use_secure_schema};

/// A rule rewrites one element in place; `Ok(true)` means it changed something
pub type RewriteRule = fn(&mut Document, NodeId, &AmperizeConfig) -> Result<bool, AmperizeError>;

/// Dispatch table keyed by source tag name
pub const RULES: &[(&str, RewriteRule)] = &[
    ("img", rewrite_img),
    ("iframe", rewrite_iframe),
    ("audio", rewrite_audio),
    ("div", rewrite_facebook_embed),
    ("blockquote", rewrite_blockquote),
];

/// Attributes `amp-youtube` does not accept
const YOUTUBE_DROPPED_ATTRIBUTES: &[&str] =
    &["src", "sandbox", "allowfullscreen", "allow", "frameborder"];

/// Facebook sizing hints superseded by the AMP layout
const FACEBOOK_DROPPED_ATTRIBUTES: &[&str] = &["data-width", "data-show-text"];

/// Look up the rule for a tag name
pub fn rule_for(tag_name: &str) -> Option<RewriteRule> {
    RULES
        .iter()
        .find(|(name, _)| *name == tag_name)
        .map(|(_, rule)| *rule)
}

/// Apply the rule set to one node
///
/// Runs the tag's own rule, then secures the `src` of any element sitting
/// directly inside an `amp-audio`.
///
/// # Errors
///
/// Returns `AmperizeError::ExtractionError` when an Instagram or Twitter embed
/// lacks the data its rule needs. The node is unchanged in that case.
pub fn apply_rules(
    doc: &mut Document,
    id: NodeId,
    config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let node = doc.node(id);
    if !node.is_element() {
        return Ok(false);
    }

    let mut rewritten = match rule_for(&node.name) {
        Some(rule) => rule(doc, id, config)?,
        None => false,
    };
    rewritten |= secure_audio_source(doc, id);

    Ok(rewritten)
}

fn rewrite_img(
    doc: &mut Document,
    id: NodeId,
    config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let node = doc.node_mut(id);
    let animated = node.attributes.get("src").is_some_and(is_gif);
    let name = if animated { "amp-anim" } else { "amp-img" };
    let defaults = config.tag(name);

    node.name = name.to_string();
    apply_dimensions(&mut node.attributes, defaults);
    node.attributes.set("layout", defaults.layout.as_str());

    Ok(true)
}

fn rewrite_iframe(
    doc: &mut Document,
    id: NodeId,
    config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let node = doc.node_mut(id);
    let Some(src) = node.attributes.get_non_empty("src") else {
        return Ok(false);
    };
    let video_id = youtube_video_id(src);
    let attrs = &mut node.attributes;

    let name = match video_id {
        Some(video_id) => {
            attrs.set("data-videoid", video_id);
            for attr in YOUTUBE_DROPPED_ATTRIBUTES {
                attrs.remove(attr);
            }
            "amp-youtube"
        }
        None => {
            use_secure_schema(attrs);
            if attrs.get_non_empty("sandbox").is_none()
                && let Some(ref sandbox) = config.tag("amp-iframe").sandbox
            {
                attrs.set("sandbox", sandbox.as_str());
            }
            "amp-iframe"
        }
    };

    let defaults = config.tag(name);
    apply_dimensions(attrs, defaults);
    set_layout_attribute(attrs, defaults);

    normalize_binary_flag(attrs, "frameborder");
    normalize_binary_flag(attrs, "scrolling");
    normalize_boolean_attribute(attrs, "allowfullscreen");
    normalize_boolean_attribute(attrs, "allowtransparency");

    node.name = name.to_string();
    Ok(true)
}

fn rewrite_audio(
    doc: &mut Document,
    id: NodeId,
    _config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let node = doc.node_mut(id);
    node.name = "amp-audio".to_string();
    use_secure_schema(&mut node.attributes);
    Ok(true)
}

fn rewrite_facebook_embed(
    doc: &mut Document,
    id: NodeId,
    config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let node = doc.node_mut(id);
    let embed_as = match node.attributes.get("class") {
        Some("fb-video") => "video",
        Some("fb-post") => "post",
        _ => return Ok(false),
    };
    let defaults = config.tag("amp-facebook");

    node.name = "amp-facebook".to_string();
    let attrs = &mut node.attributes;
    for attr in FACEBOOK_DROPPED_ATTRIBUTES {
        attrs.remove(attr);
    }
    apply_dimensions(attrs, defaults);
    attrs.set("layout", defaults.layout.as_str());
    attrs.set("data-embed-as", embed_as);
    attrs.set("data-align-center", "true");

    doc.clear_children(id);
    Ok(true)
}

fn rewrite_blockquote(
    doc: &mut Document,
    id: NodeId,
    config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let class = doc.node(id).attributes.get("class").map(str::to_owned);
    match class.as_deref() {
        Some("instagram-media") => rewrite_instagram(doc, id, config),
        Some("twitter-tweet") => rewrite_twitter(doc, id, config),
        _ => Ok(false),
    }
}

fn rewrite_instagram(
    doc: &mut Document,
    id: NodeId,
    config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let node = doc.node_mut(id);
    let permalink = node
        .attributes
        .get("data-instgrm-permalink")
        .ok_or_else(|| {
            AmperizeError::ExtractionError(
                "instagram embed has no data-instgrm-permalink attribute".to_string(),
            )
        })?;
    let shortcode = instagram_shortcode(permalink).ok_or_else(|| {
        AmperizeError::ExtractionError(format!(
            "no shortcode in instagram permalink '{}'",
            permalink
        ))
    })?;
    let defaults = config.tag("amp-instagram");

    node.name = "amp-instagram".to_string();
    node.attributes.clear();
    node.attributes.set("data-shortcode", shortcode);
    apply_dimensions(&mut node.attributes, defaults);
    node.attributes.set("layout", defaults.layout.as_str());

    doc.clear_children(id);
    Ok(true)
}

fn rewrite_twitter(
    doc: &mut Document,
    id: NodeId,
    config: &AmperizeConfig,
) -> Result<bool, AmperizeError> {
    let tweet = doc
        .find_descendant(id, |node| {
            node.is_element_named("a")
                && node.attributes.get("href").and_then(tweet_id).is_some()
        })
        .and_then(|anchor| doc.node(anchor).attributes.get("href").and_then(tweet_id))
        .ok_or_else(|| {
            AmperizeError::ExtractionError(
                "twitter embed contains no link to a tweet status".to_string(),
            )
        })?;
    let defaults = config.tag("amp-twitter");

    let node = doc.node_mut(id);
    node.name = "amp-twitter".to_string();
    node.attributes.clear();
    apply_dimensions(&mut node.attributes, defaults);
    node.attributes.set("layout", defaults.layout.as_str());
    node.attributes.set("data-tweetid", tweet);

    doc.clear_children(id);
    Ok(true)
}

/// Secure the `src` of an element whose parent is an `amp-audio`
fn secure_audio_source(doc: &mut Document, id: NodeId) -> bool {
    let in_audio = doc
        .parent_of(id)
        .is_some_and(|parent| parent.is_element_named("amp-audio"));
    in_audio && use_secure_schema(&mut doc.node_mut(id).attributes)
}

fn apply_dimensions(attrs: &mut Attributes, defaults: &TagDefaults) {
    attrs.set("width", defaults.width.to_string());
    attrs.set("height", defaults.height.to_string());
}

/// `"0"` stays `"0"`, any other present value becomes `"1"`
fn normalize_binary_flag(attrs: &mut Attributes, name: &str) {
    if let Some(value) = attrs.get(name) {
        let flag = if value == "0" { "0" } else { "1" };
        attrs.set(name, flag);
    }
}

/// A literal `"false"` removes the attribute; any other value becomes a bare flag
fn normalize_boolean_attribute(attrs: &mut Attributes, name: &str) {
    match attrs.get(name) {
        Some("false") => {
            attrs.remove(name);
        }
        Some(_) => attrs.set(name, ""),
        None => {}
    }
}

/// Whether the path of `src` ends in `.gif`
///
/// Query strings and fragments are ignored. Relative sources are resolved
/// against a placeholder origin so only their path is inspected.
pub fn is_gif(src: &str) -> bool {
    static PLACEHOLDER_BASE: OnceLock<Option<Url>> = OnceLock::new();
    let base = PLACEHOLDER_BASE.get_or_init(|| Url::parse("https://amperize.invalid/").ok());

    match base.as_ref().and_then(|base| base.join(src).ok()) {
        Some(url) => url.path().ends_with(".gif"),
        None => src
            .split(['?', '#'])
            .next()
            .is_some_and(|path| path.ends_with(".gif")),
    }
}

/// Extract the 11-character video id from a YouTube watch or embed URL
pub fn youtube_video_id(src: &str) -> Option<String> {
    static YOUTUBE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = YOUTUBE_REGEX.get_or_init(|| {
        Regex::new(r"^.*(youtu\.be/|youtube(-nocookie)?\.com/(v/|.*u/\w/|embed/|.*v=))([\w-]{11}).*")
            .ok()
    });
    let regex = regex.as_ref()?;

    regex
        .captures(src)
        .and_then(|caps| caps.get(4))
        .map(|m| m.as_str().to_string())
}

/// Extract the shortcode following `/p/` in an Instagram permalink
pub fn instagram_shortcode(permalink: &str) -> Option<String> {
    static SHORTCODE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = SHORTCODE_REGEX.get_or_init(|| Regex::new(r"/p/([^/?#]+)").ok());
    let regex = regex.as_ref()?;

    regex
        .captures(permalink)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the numeric tweet id from a tweet status URL
pub fn tweet_id(href: &str) -> Option<String> {
    static TWEET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = TWEET_REGEX.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.|mobile\.)?(?:twitter|x)\.com/(?:#!/)?\w+/status(?:es)?/(\d+)")
            .ok()
    });
    let regex = regex.as_ref()?;

    regex
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

//! Configuration tests
//!
//! Verify that caller-supplied defaults flow into the rewritten markup and
//! that the engine options change conversion behaviour.

use amperize::config::ConfigOverrides;
use amperize::{Amperize, AmperizeConfig, AmperizeError, ExtractionPolicy, Layout, TagDefaults};

/// Test per-tag overrides from JSON reach the output
#[test]
fn test_json_overrides_reach_output() {
    let config = AmperizeConfig::from_json(
        r#"{
            "amp-img": {"width": 600, "height": 400},
            "amp-youtube": {"layout": "fixed-height", "height": 270}
        }"#,
    )
    .expect("valid configuration");
    let amperize = Amperize::with_config(config);

    let output = amperize
        .parse_blocking(r#"<img src="a.png"><iframe src="https://youtu.be/dQw4w9WgXcQ"></iframe>"#)
        .expect("Conversion failed");

    assert_eq!(
        output,
        concat!(
            r#"<amp-img src="a.png" width="600" height="400" layout="responsive"></amp-img>"#,
            r#"<amp-youtube data-videoid="dQw4w9WgXcQ" width="380" height="270" layout="fixed-height"></amp-youtube>"#
        )
    );
}

/// Test that an explicit sandbox override replaces the default
#[test]
fn test_iframe_sandbox_override() {
    let config = AmperizeConfig::from_json(r#"{"amp-iframe": {"sandbox": "allow-scripts"}}"#)
        .expect("valid configuration");

    let output = Amperize::with_config(config)
        .parse_blocking(r#"<iframe src="https://example.com"></iframe>"#)
        .expect("Conversion failed");

    assert!(output.contains(r#"sandbox="allow-scripts""#), "{output}");
}

/// Test narrow configured iframe widths switch to a fixed layout
#[test]
fn test_narrow_iframe_gets_fixed_layout() {
    let mut config = AmperizeConfig::default();
    config.set_tag(
        "amp-iframe",
        TagDefaults {
            sandbox: Some("allow-scripts".to_string()),
            ..TagDefaults::responsive(250, 250)
        },
    );

    let output = Amperize::with_config(config)
        .parse_blocking(r#"<iframe src="https://example.com/w"></iframe>"#)
        .expect("Conversion failed");

    assert!(output.contains(r#"layout="fixed""#), "{output}");
}

/// Test the skip policy leaves unextractable embeds in place
#[test]
fn test_skip_policy() {
    let config = AmperizeConfig::with_overrides(ConfigOverrides {
        extraction_policy: Some(ExtractionPolicy::Skip),
        ..ConfigOverrides::default()
    });

    let html = r#"<blockquote class="instagram-media"><p>caption</p></blockquote><img src="a.gif">"#;
    let output = Amperize::with_config(config)
        .parse_blocking(html)
        .expect("Conversion failed");

    assert_eq!(
        output,
        r#"<blockquote class="instagram-media"><p>caption</p></blockquote><amp-anim src="a.gif" width="380" height="280" layout="responsive"></amp-anim>"#
    );
}

/// Test the nesting limit comes from the configuration
#[test]
fn test_max_depth_override() {
    let config = AmperizeConfig::from_json(r#"{"max_depth": 3}"#).expect("valid configuration");
    let amperize = Amperize::with_config(config);

    assert!(amperize.parse_blocking("<div><p><em>ok</em></p></div>").is_ok());

    let result = amperize.parse_blocking("<div><div><div><div>deep</div></div></div></div>");
    match result {
        Err(err @ AmperizeError::ParseError(_)) => assert_eq!(err.kind(), "parse"),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

/// Test malformed configuration is reported as such
#[test]
fn test_invalid_configuration() {
    for json in [r#"{"amp-img": {"width": -1}}"#, r#"{"amp-img": {"layout": "big"}}"#, "not json"] {
        match AmperizeConfig::from_json(json) {
            Err(err @ AmperizeError::InvalidConfig(_)) => {
                assert!(err.to_string().starts_with("Invalid configuration"), "{err}");
            }
            other => panic!("Expected InvalidConfig for {json}, got {:?}", other),
        }
    }
}

/// Test the pass-through options survive untouched
#[test]
fn test_request_timeout_pass_through() {
    let config = AmperizeConfig::from_json(r#"{"request_timeout": 10000}"#).expect("valid");
    let amperize = Amperize::with_config(config);

    assert_eq!(amperize.config().request_timeout.as_millis(), 10000);
    assert_eq!(amperize.config().tag("amp-img").layout, Layout::Responsive);
}

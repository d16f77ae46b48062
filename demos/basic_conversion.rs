//! Basic conversion example demonstrating the AMP rewriter
//!
//! Logs at DEBUG level so per-call correlation ids and traversal summaries
//! show up next to the output.

use amperize::{Amperize, AmperizeConfig, AmperizeError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Amperize - Basic Examples ===\n");

    let amperize = Amperize::new();

    // Example 1: Images, animated and still
    show(
        &amperize,
        "Images",
        r#"<p>A still <img src="/images/photo.jpg" alt="Photo"> and a loop <img src="/images/dance.gif"></p>"#,
    )
    .await;

    // Example 2: Video and generic iframes
    show(
        &amperize,
        "Iframes",
        r#"<iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ" frameborder="0" allowfullscreen></iframe><iframe src="http://giphy.com/embed/abc"></iframe>"#,
    )
    .await;

    // Example 3: Social embeds
    show(
        &amperize,
        "Social embeds",
        r#"<blockquote class="twitter-tweet"><p>Hello</p><a href="https://twitter.com/user/status/1234567890">Jan 1</a></blockquote><blockquote class="instagram-media" data-instgrm-permalink="https://www.instagram.com/p/BOpTb6qhS3J/"></blockquote>"#,
    )
    .await;

    // Example 4: Forbidden elements are dropped
    show(
        &amperize,
        "Suppression",
        r#"<style>p{color:red}</style><p>Before</p><script>alert('x')</script><p>After</p>"#,
    )
    .await;

    // Example 5: Custom dimensions
    match AmperizeConfig::from_json(r#"{"amp-img": {"width": 600, "height": 400}}"#) {
        Ok(config) => {
            show(
                &Amperize::with_config(config),
                "Custom dimensions",
                r#"<img src="/images/wide.png">"#,
            )
            .await
        }
        Err(err) => eprintln!("Configuration rejected: {}", err),
    }

    // Example 6: Callback delivery
    amperize
        .parse_with(
            r#"<audio src="http://example.com/a.mp3"></audio>"#,
            Some(|result: Result<String, AmperizeError>| match result {
                Ok(amp) => println!("Callback received: {}\n", amp),
                Err(err) => eprintln!("Callback received error: {}\n", err),
            }),
        )
        .await
        .expect("callback supplied");
}

async fn show(amperize: &Amperize, title: &str, html: &str) {
    println!("Example: {}", title);
    println!("Input HTML:\n{}\n", html);

    match amperize.parse(html).await {
        Ok(amp) => println!("Output AMP:\n{}", amp),
        Err(err) => eprintln!("Conversion failed: {}", err),
    }
    println!("---\n");
}

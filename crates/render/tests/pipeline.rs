use mdpress_core::MstNode;
use mdpress_render::{
    BatchOptions, FeedEntry, Pipeline, RenderError, RenderOptions, render, render_batch,
    render_feed_batch, render_for_feed, render_full,
};

#[test]
fn rendering_is_deterministic() {
    let input = "# Title\n\nSome $x$ and `code`.\n\n```rust\nfn main() {}\n```\n\nRef[^n].\n\n[^n]: Note.";
    assert_eq!(render_full(input).unwrap(), render_full(input).unwrap());
    assert_eq!(render_for_feed(input).unwrap(), render_for_feed(input).unwrap());
}

#[test]
fn heading_gets_raw_text_id_and_anchor() {
    insta::assert_snapshot!(
        render_full("## Hello World").unwrap(),
        @r#"<h2 id="Hello World">Hello World<span class="anchor-link" data-scroll-target="Hello World">#</span></h2>"#
    );
}

#[test]
fn duplicate_headings_share_id() {
    let html = render_full("## A\n\n## A").unwrap();
    assert_eq!(html.matches(r#"<h2 id="A">"#).count(), 2);
}

#[test]
fn alert_blocks() {
    let expected = concat!(
        r#"<div class="markdown-alert markdown-alert-tip" data-alert="TIP">"#,
        r#"<p class="markdown-alert-title">Tip</p><p>Do this</p></div>"#
    );
    assert_eq!(render_full("> [!TIP]\nDo this").unwrap(), expected);
    assert_eq!(render_full("> [!tip]\nDo this").unwrap(), expected);
    assert_eq!(
        render_full("> Not an alert").unwrap(),
        "<blockquote><p>Not an alert</p></blockquote>"
    );
}

#[test]
fn alerts_are_not_recognized_in_feed() {
    let html = render_for_feed("> [!NOTE]\n> Hi").unwrap();
    assert!(html.starts_with("<blockquote>"));
    assert!(!html.contains("markdown-alert"));
}

#[test]
fn center_directive() {
    insta::assert_snapshot!(
        render_for_feed(":::center\nHi\n:::").unwrap(),
        @r#"<div class="text-center"><p>Hi</p></div>"#
    );
    assert_eq!(
        render_full(":::center\nHi\n:::").unwrap(),
        r#"<div class="text-center"><p>Hi</p></div>"#
    );
}

#[test]
fn unknown_directive_is_plain_div() {
    assert_eq!(
        render_for_feed(":::sidebar\nHi\n:::").unwrap(),
        "<div><p>Hi</p></div>"
    );
}

#[test]
fn directive_inside_fenced_code_is_code() {
    let html = render_for_feed("```md\n:::center\nHi\n:::\n```").unwrap();
    assert_eq!(
        html,
        "<pre><code class=\"language-md\">:::center\nHi\n:::\n</code></pre>"
    );
}

#[test]
fn footnote_links_are_rewired_in_full_mode() {
    let html = render_full("Text[^1]\n\n[^1]: Note.").unwrap();
    assert!(!html.contains("user-content-"), "{html}");
    assert!(html.contains(r#"id="fnref-1""#));
    assert!(html.contains(r#"<li id="fn-1">"#));
    assert!(html.contains(r#"data-scroll-target="fn-1""#));
    assert!(html.contains(r#"data-scroll-target="fnref-1""#));
    assert!(!html.contains("href=\"#"));
}

#[test]
fn raw_html_passes_through() {
    let raw = r#"<div class="x">raw</div>"#;
    assert_eq!(render_full(raw).unwrap(), raw);
    assert_eq!(render_for_feed(raw).unwrap(), raw);
}

#[test]
fn raw_html_can_be_disabled() {
    let options = RenderOptions {
        allow_raw_html: false,
        ..RenderOptions::feed()
    };
    let html = render(r#"<div class="x">raw</div>"#, &options).unwrap();
    assert!(html.starts_with("&lt;div"));
}

#[test]
fn feed_mode_has_no_anchors_and_keeps_hrefs() {
    let input = "## Hi\n\nText[^1]\n\n[^1]: Note.";

    let feed = render_for_feed(input).unwrap();
    assert!(feed.starts_with("<h2>Hi</h2>"));
    assert!(!feed.contains("anchor-link"));
    assert!(feed.contains(r##"href="#user-content-fn-1""##));

    let full = render_full(input).unwrap();
    assert!(full.contains(r#"<h2 id="Hi">"#));
    assert!(full.contains("anchor-link"));
    assert!(!full.contains(r##"href="#user-content-fn-1""##));
}

#[test]
fn bad_math_degrades_to_error_span() {
    let html = render_full("Before.\n\n$$\n\\frac{1\n$$\n\nAfter.").unwrap();
    assert!(html.starts_with("<p>Before.</p>"), "{html}");
    assert!(html.contains(r#"<span class="math-error""#));
    assert!(html.ends_with("<p>After.</p>"));

    let inline = render_full(r"Text $$\frac{1$$ here.").unwrap();
    assert!(inline.contains("math-error"), "{inline}");
}

#[test]
fn good_math_renders_with_katex() {
    let html = render_full("Area $\\pi r^2$.").unwrap();
    assert!(html.contains(r#"<span class="math math-inline">"#));
    assert!(html.contains("katex"));
}

#[test]
fn feed_mode_leaves_dollars_alone() {
    assert_eq!(
        render_for_feed("It costs $5 or $6.").unwrap(),
        "<p>It costs $5 or $6.</p>"
    );
}

#[test]
fn unknown_code_language_is_plain() {
    let html = render_full("```nosuchlang\nx\n```").unwrap();
    assert_eq!(
        html,
        "<pre><code class=\"language-nosuchlang\">x\n</code></pre>"
    );
    assert!(!html.contains("<span"));
}

#[test]
fn known_code_language_is_highlighted() {
    let html = render_full("```rust\nlet x = 1;\n```").unwrap();
    assert!(html.contains(r#"class="language-rust highlighted""#));
    assert!(html.contains(r#"<span class="hl-"#));
}

#[test]
fn typescript_fences_are_highlighted() {
    for lang in ["ts", "typescript", "tsx"] {
        let html = render_full(&format!("```{lang}\nconst x: number = 1;\n```")).unwrap();
        assert!(
            html.contains(&format!(r#"class="language-{lang} highlighted""#)),
            "{html}"
        );
        assert!(html.contains(r#"<span class="hl-"#), "{html}");
    }
}

#[test]
fn directive_fences_inside_raw_html_stay_verbatim() {
    let html = render_for_feed("<pre>\n:::center\nHi\n:::\n</pre>\n").unwrap();
    assert_eq!(html, "<pre>\n:::center\nHi\n:::\n</pre>");
}

#[test]
fn directive_closer_ends_inner_raw_html() {
    assert_eq!(
        render_for_feed(":::center\n<img src=\"a.png\">\n:::").unwrap(),
        r#"<div class="text-center"><img src="a.png"></div>"#
    );
}

#[test]
fn marker_lookalike_text_survives() {
    assert_eq!(
        render_full("MDPRESSDIRECTIVE0OPEN").unwrap(),
        "<p>MDPRESSDIRECTIVE0OPEN</p>"
    );
}

#[test]
fn directive_in_nested_list_item() {
    let html = render_for_feed("- a\n  - b\n    :::center\n    Hi\n    :::").unwrap();
    assert!(html.contains(r#"<div class="text-center"><p>Hi</p></div>"#), "{html}");
    assert!(!html.contains(":::"), "{html}");
}

#[test]
fn heading_with_math_keeps_tex_in_id() {
    let html = render_full("## Euler $e^x$").unwrap();
    assert!(html.starts_with(r#"<h2 id="Euler e^x">"#), "{html}");
}

#[test]
fn gfm_constructs() {
    let html = render_for_feed(
        "~~old~~ www.example.com\n\n| a |\n|---|\n| 1 |\n\n- [x] done",
    )
    .unwrap();
    assert!(html.contains("<del>old</del>"));
    assert!(html.contains(r#"<a href="http://www.example.com">www.example.com</a>"#));
    assert!(html.contains("<table><thead><tr><th>a</th></tr></thead>"));
    assert!(html.contains(r#"<input type="checkbox" disabled checked>"#));
}

#[test]
fn reference_links_resolve() {
    assert_eq!(
        render_for_feed("[home][h]\n\n[h]: /index \"Home\"").unwrap(),
        r#"<p><a href="/index" title="Home">home</a></p>"#
    );
}

#[test]
fn batch_isolates_entries() {
    let outcome = render_feed_batch(
        vec![
            FeedEntry::new("a", ":::center\nHi\n:::"),
            FeedEntry::new("b", "plain"),
        ],
        &BatchOptions::default(),
    );
    assert_eq!(outcome.stats.succeeded, 2);
    assert_eq!(
        outcome.results[0].html.as_deref(),
        Some(r#"<div class="text-center"><p>Hi</p></div>"#)
    );
    assert_eq!(outcome.results[1].html.as_deref(), Some("<p>plain</p>"));
}

fn reject_marked(root: &mut MstNode) {
    if root.text_content().contains("reject me") {
        panic!("entry rejected");
    }
}

#[test]
fn batch_reports_failed_entries() {
    let mut pipeline = Pipeline::feed();
    pipeline.push_mst_stage("reject", reject_marked);
    let outcome = render_batch(
        &pipeline,
        vec![
            FeedEntry::new("good", "fine"),
            FeedEntry::new("bad", "reject me"),
        ],
        &BatchOptions::default(),
    );
    assert_eq!(outcome.stats.succeeded, 1);
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.results[0].html.as_deref(), Some("<p>fine</p>"));
    assert_eq!(outcome.results[1].html, None);
    assert_eq!(
        outcome.results[1].error.as_deref(),
        Some("failed to parse markdown content")
    );
}

#[test]
fn render_error_is_generic() {
    assert_eq!(
        RenderError::Failed.to_string(),
        "failed to parse markdown content"
    );
}

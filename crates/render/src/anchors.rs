//! Heading anchor injection.
//!
//! Each heading gets its raw text as `id` and a trailing anchor link that
//! the delegated listener in [`crate::SCROLL_SCRIPT`] activates.

use crate::hst::{Element, HstNode};

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Adds an `id` and an anchor-link child to every heading.
///
/// The id is the trimmed heading text, unchanged: no slugging and no
/// deduplication.
pub fn inject_anchors(node: &mut HstNode) {
    node.visit_elements_mut(&mut |element| {
        if HEADING_TAGS.contains(&element.tag.as_str()) {
            anchor_heading(element);
        }
    });
}

fn anchor_heading(heading: &mut Element) {
    let mut text = String::new();
    collect_text(&heading.children, &mut text);
    let text = text.trim().to_string();
    heading.attributes.set("id", text.as_str());
    heading.children.push(
        Element::new("span")
            .attr("class", "anchor-link")
            .attr("data-scroll-target", text)
            .child(HstNode::text("#"))
            .into(),
    );
}

/// Concatenates text leaves; rendered math contributes its TeX source.
fn collect_text(nodes: &[HstNode], out: &mut String) {
    for node in nodes {
        match node {
            HstNode::Text(text) => out.push_str(text),
            HstNode::Element(element) if element.has_class("math") => {
                if let Some(source) = element.children.iter().find_map(tex_annotation) {
                    out.push_str(&source);
                }
            }
            HstNode::Element(element) => collect_text(&element.children, out),
            HstNode::Root(children) => collect_text(children, out),
            HstNode::Raw(_) => {}
        }
    }
}

/// TeX source from the MathML annotation in KaTeX output.
fn tex_annotation(node: &HstNode) -> Option<String> {
    const OPEN: &str = r#"<annotation encoding="application/x-tex">"#;
    let HstNode::Raw(html) = node else {
        return None;
    };
    let start = html.find(OPEN)? + OPEN.len();
    let end = html[start..].find("</annotation>")? + start;
    Some(html_escape::decode_html_entities(&html[start..end]).into_owned())
}

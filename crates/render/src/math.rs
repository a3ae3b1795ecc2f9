//! Math rendering with KaTeX.
//!
//! Replaces the converter's math placeholders (and ```` ```math ```` code
//! blocks) with KaTeX markup. A failing expression turns into an error span
//! carrying the message; nothing else in the document is affected.

use crate::hst::{Element, HstNode};

/// A math placeholder found in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Placeholder {
    Inline(String),
    Display(String),
}

/// Renders every math placeholder in the tree.
pub fn render_math(node: &mut HstNode) {
    let Some(children) = node.children_mut() else {
        return;
    };
    for child in children.iter_mut() {
        match placeholder(child) {
            Some(Placeholder::Inline(source)) => *child = render_expression(&source, false),
            Some(Placeholder::Display(source)) => *child = render_expression(&source, true),
            None => render_math(child),
        }
    }
}

fn placeholder(node: &HstNode) -> Option<Placeholder> {
    let element = node.as_element()?;
    match element.tag.as_str() {
        "code" if element.has_class("math-inline") => {
            Some(Placeholder::Inline(element.text_content()))
        }
        "pre" => {
            let code = match element.children.as_slice() {
                [HstNode::Element(code)] if code.tag == "code" => code,
                _ => return None,
            };
            code.has_class("language-math").then(|| {
                Placeholder::Display(code.text_content().trim_end_matches('\n').to_string())
            })
        }
        _ => None,
    }
}

/// Renders one expression, falling back to an error span.
pub fn render_expression(source: &str, display: bool) -> HstNode {
    match katex_html(source, display) {
        Ok(html) => {
            let class = if display {
                "math math-display"
            } else {
                "math math-inline"
            };
            Element::new(if display { "div" } else { "span" })
                .attr("class", class)
                .child(HstNode::Raw(html))
                .into()
        }
        Err(message) => {
            log::warn!("math: failed to render `{}`: {}", source, message);
            Element::new("span")
                .attr("class", "math-error")
                .attr("title", message)
                .child(HstNode::text(source))
                .into()
        }
    }
}

fn katex_html(source: &str, display: bool) -> Result<String, String> {
    let opts = katex::Opts::builder()
        .display_mode(display)
        .build()
        .map_err(|err| err.to_string())?;
    katex::render_with_opts(source, &opts).map_err(|err| katex_message(&err.to_string()))
}

/// Extracts KaTeX's own message from the JS engine's error wrapper.
fn katex_message(raw: &str) -> String {
    const PARSE_ERROR: &str = "ParseError: ";
    let Some(start) = raw
        .find("KaTeX parse error")
        .or_else(|| raw.find(PARSE_ERROR).map(|index| index + PARSE_ERROR.len()))
    else {
        return raw.to_string();
    };
    let message = &raw[start..];
    // The wrapper prints the JS string with Rust debug quoting.
    let message = match message.rfind('"') {
        Some(end) if raw[..start].contains('"') => &message[..end],
        _ => message,
    };
    message.replace("\\\"", "\"").replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::serialize;

    fn inline(source: &str) -> HstNode {
        Element::new("code")
            .attr("class", "language-math math-inline")
            .child(HstNode::text(source))
            .into()
    }

    fn display(source: &str, class: &str) -> HstNode {
        Element::new("pre")
            .child(
                Element::new("code")
                    .attr("class", class)
                    .child(HstNode::text(source))
                    .into(),
            )
            .into()
    }

    #[test]
    fn renders_inline_math() {
        let mut tree = HstNode::Root(vec![Element::new("p").child(inline("x^2")).into()]);
        render_math(&mut tree);
        let html = serialize(&tree);
        assert!(html.starts_with(r#"<p><span class="math math-inline">"#), "{html}");
        assert!(html.contains("katex"));
    }

    #[test]
    fn renders_display_math_and_math_fences() {
        for class in ["language-math math-display", "language-math"] {
            let mut tree = HstNode::Root(vec![display("a+b\n", class)]);
            render_math(&mut tree);
            let html = serialize(&tree);
            assert!(html.starts_with(r#"<div class="math math-display">"#), "{html}");
        }
    }

    #[test]
    fn bad_expression_becomes_error_span() {
        let mut tree = HstNode::Root(vec![
            display(r"\frac{1", "language-math math-display"),
            Element::new("p").child(HstNode::text("after")).into(),
        ]);
        render_math(&mut tree);
        let html = serialize(&tree);
        assert!(html.starts_with(r#"<span class="math-error" title=""#), "{html}");
        assert!(html.contains(r"\frac{1</span>"));
        assert!(html.ends_with("<p>after</p>"));
    }

    #[test]
    fn error_title_is_the_katex_message() {
        let wrapped = r#"failed to execute js (detail: String("ParseError: KaTeX parse error: Expected '}', got 'EOF' at end of input: \\frac{1"))"#;
        assert_eq!(
            katex_message(wrapped),
            r"KaTeX parse error: Expected '}', got 'EOF' at end of input: \frac{1"
        );
        assert_eq!(katex_message("plain failure"), "plain failure");

        let HstNode::Element(span) = render_expression(r"\frac{1", false) else {
            panic!("expected element");
        };
        let title = span.attributes.get("title").unwrap_or_default();
        assert!(title.starts_with("KaTeX parse error"), "{title}");
        assert!(!title.contains("failed to execute js"), "{title}");
    }

    #[test]
    fn other_code_is_untouched() {
        let original = HstNode::Root(vec![display("fn main() {}\n", "language-rust")]);
        let mut tree = original.clone();
        render_math(&mut tree);
        assert_eq!(tree, original);
    }
}

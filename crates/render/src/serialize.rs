//! HST serializer.

use crate::hst::{Element, HstNode};

/// Elements without content or closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Attributes rendered bare when their value is empty.
const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "checked",
    "disabled",
    "data-footnotes",
    "data-footnote-ref",
    "data-footnote-backref",
];

/// Serializes an HST to an HTML string.
///
/// No whitespace is inserted between elements.
pub fn serialize(node: &HstNode) -> String {
    let mut out = String::with_capacity(4096);
    write_node(node, &mut out);
    out
}

fn write_node(node: &HstNode, out: &mut String) {
    match node {
        HstNode::Root(children) => children.iter().for_each(|child| write_node(child, out)),
        HstNode::Element(element) => write_element(element, out),
        HstNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        HstNode::Raw(raw) => out.push_str(raw),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in element.attributes.iter() {
        out.push(' ');
        out.push_str(name);
        if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(&name) {
            continue;
        }
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        let node: HstNode = Element::new("a")
            .attr("title", r#"say "hi" & bye"#)
            .child(HstNode::text("1 < 2 & 3 > 2"))
            .into();
        assert_eq!(
            serialize(&node),
            r#"<a title="say &quot;hi&quot; &amp; bye">1 &lt; 2 &amp; 3 &gt; 2</a>"#
        );
    }

    #[test]
    fn raw_is_verbatim() {
        let node = HstNode::Root(vec![HstNode::Raw(r#"<div class="x">raw</div>"#.into())]);
        assert_eq!(serialize(&node), r#"<div class="x">raw</div>"#);
    }

    #[test]
    fn void_and_boolean_attributes() {
        let node = HstNode::Root(vec![
            Element::new("input")
                .attr("type", "checkbox")
                .attr("disabled", "")
                .attr("checked", "")
                .into(),
            Element::new("hr").into(),
            Element::new("br").into(),
        ]);
        assert_eq!(
            serialize(&node),
            r#"<input type="checkbox" disabled checked><hr><br>"#
        );
    }

    #[test]
    fn empty_id_is_kept() {
        let node: HstNode = Element::new("h2").attr("id", "").into();
        assert_eq!(serialize(&node), r#"<h2 id=""></h2>"#);
    }
}

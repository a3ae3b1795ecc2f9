//! Footnote link rewriting for in-page scrolling.

use crate::FOOTNOTE_ID_PREFIX;
use crate::hst::{Element, HstNode};

/// Strips the footnote id prefix and turns fragment links into scroll targets.
///
/// Every `id` starting with `user-content-` loses the prefix. Every `a`
/// whose `href` starts with `#` loses the `href` and gains
/// `data-scroll-target` holding the fragment without the prefix.
pub fn rewrite_footnotes(node: &mut HstNode) {
    node.visit_elements_mut(&mut rewrite_element);
}

fn rewrite_element(element: &mut Element) {
    if let Some(id) = element.attributes.get("id")
        && let Some(stripped) = id.strip_prefix(FOOTNOTE_ID_PREFIX)
    {
        let stripped = stripped.to_string();
        element.attributes.set("id", stripped);
    }

    if element.tag != "a" {
        return;
    }
    let Some(fragment) = element
        .attributes
        .get("href")
        .and_then(|href| href.strip_prefix('#'))
        .map(|fragment| strip_prefix(fragment).to_string())
    else {
        return;
    };
    element.attributes.remove("href");
    element.attributes.set("data-scroll-target", fragment);
}

fn strip_prefix(value: &str) -> &str {
    value.strip_prefix(FOOTNOTE_ID_PREFIX).unwrap_or(value)
}

//! Directive transform: assigns wrapper elements to known directive names.

use mdpress_core::{Directive, MstNode, Wrapper};

/// Wrapper for a directive name, if the name is known.
pub fn wrapper_for(name: &str) -> Option<Wrapper> {
    match name {
        "center" => Some(Wrapper {
            tag: "div".to_string(),
            class: Some("text-center".to_string()),
        }),
        _ => None,
    }
}

/// Sets render metadata on every container directive in the tree.
///
/// Unknown names keep `wrapper: None` and render as a plain `div`.
pub fn apply_directive_wrappers(node: &mut MstNode) {
    if let MstNode::ContainerDirective(Directive { name, wrapper, .. }) = node {
        *wrapper = wrapper_for(name);
        if wrapper.is_none() {
            log::debug!("directive :::{name} has no wrapper, rendering as div");
        }
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            apply_directive_wrappers(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(name: &str, children: Vec<MstNode>) -> MstNode {
        MstNode::ContainerDirective(Directive {
            name: name.to_string(),
            label: None,
            attributes: Vec::new(),
            children,
            wrapper: None,
        })
    }

    #[test]
    fn center_gets_text_center_div() {
        let mut root = MstNode::Root(vec![directive("center", Vec::new())]);
        apply_directive_wrappers(&mut root);
        let MstNode::Root(children) = &root else {
            panic!("expected root");
        };
        let MstNode::ContainerDirective(d) = &children[0] else {
            panic!("expected directive");
        };
        assert_eq!(
            d.wrapper,
            Some(Wrapper {
                tag: "div".to_string(),
                class: Some("text-center".to_string())
            })
        );
    }

    #[test]
    fn nested_and_unknown_names() {
        let mut root = directive("aside", vec![directive("center", Vec::new())]);
        apply_directive_wrappers(&mut root);
        let MstNode::ContainerDirective(outer) = &root else {
            panic!("expected directive");
        };
        assert!(outer.wrapper.is_none());
        assert!(matches!(
            &outer.children[0],
            MstNode::ContainerDirective(inner) if inner.wrapper.is_some()
        ));
    }

    #[test]
    fn name_match_is_exact() {
        assert!(wrapper_for("Center").is_none());
        assert!(wrapper_for("centered").is_none());
    }
}

//! Markdown parsing into the MST, with extension hooks.

use crate::alert::recognize_alerts;
use crate::directives::mark_directives;
use crate::mst::{LabelParser, MstNode, regroup_directives};
use crate::{MarkdownError, SourceLocation};
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable math constructs (`$inline$` and `$$block$$`).
    pub math: bool,
    /// Enable `:::name` container directives.
    pub directives: bool,
    /// Recognize `> [!NOTE]` alert blockquotes.
    pub alerts: bool,
    /// Parse raw HTML into `Html` nodes.
    pub raw_html: bool,
}

impl ParseOptions {
    /// Blog page defaults: everything on.
    pub const fn full() -> Self {
        Self {
            gfm: true,
            math: true,
            directives: true,
            alerts: true,
            raw_html: true,
        }
    }

    /// Feed defaults: no math syntax, no alerts.
    pub const fn feed() -> Self {
        Self {
            gfm: true,
            math: false,
            directives: true,
            alerts: false,
            raw_html: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: false,
            code_indented: true,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Trait for mutating the MST after parsing.
pub trait MstTransform {
    /// Mutate the tree in place.
    fn transform(&self, root: &mut MstNode);
}

impl<F> MstTransform for F
where
    F: Fn(&mut MstNode),
{
    fn transform(&self, root: &mut MstNode) {
        (self)(root)
    }
}

/// Parser pipeline: parse, then run the registered tree transforms in order.
pub struct ParserPipeline {
    options: ParseOptions,
    transforms: Vec<Box<dyn MstTransform + Send + Sync>>,
}

impl ParserPipeline {
    /// Create a pipeline with the given options and no extra transforms.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            transforms: Vec::new(),
        }
    }

    /// Options this pipeline parses with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Add a tree transform.
    pub fn push_transform<T>(&mut self, transform: T)
    where
        T: MstTransform + Send + Sync + 'static,
    {
        self.transforms.push(Box::new(transform));
    }

    /// Parse and transform.
    pub fn parse(&self, input: &str) -> Result<MstNode, MarkdownError> {
        let mut root = parse(input, &self.options)?;
        for transform in &self.transforms {
            transform.transform(&mut root);
        }
        Ok(root)
    }
}

/// Parse Markdown into an MST.
///
/// Directives are regrouped and, when enabled, alerts recognized. Non-fatal
/// findings (unclosed directives, stray closers) are logged at debug level.
pub fn parse(input: &str, options: &ParseOptions) -> Result<MstNode, MarkdownError> {
    let md_options = options.to_markdown();

    if !options.directives {
        let tree = parse_mdast_with_options(input, &md_options)?;
        let mut root = MstNode::from_mdast(&tree);
        if options.alerts {
            recognize_alerts(&mut root);
        }
        return Ok(root);
    }

    let marked = mark_directives(input);
    marked.diagnostics.log();
    let tree = parse_mdast_with_options(&marked.text, &md_options)?;
    let mut root = MstNode::from_mdast(&tree);
    regroup_directives(&mut root, &marked, &LabelParser::new(&md_options));
    if options.alerts {
        recognize_alerts(&mut root);
    }
    Ok(root)
}

/// Parse Markdown into a markdown-rs tree.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<markdown::mdast::Node, MarkdownError> {
    markdown::to_mdast(input, options).map_err(|err| MarkdownError::Parse {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;

    fn blocks(input: &str, options: &ParseOptions) -> Vec<MstNode> {
        match parse(input, options).unwrap() {
            MstNode::Root(children) => children,
            other => panic!("expected root, got {other:?}"),
        }
    }

    #[test]
    fn groups_directive_body() {
        let children = blocks(":::center\nHi\n:::", &ParseOptions::feed());
        assert_eq!(children.len(), 1);
        let MstNode::ContainerDirective(directive) = &children[0] else {
            panic!("expected directive, got {:?}", children[0]);
        };
        assert_eq!(directive.name, "center");
        assert_eq!(directive.children.len(), 1);
        assert_eq!(directive.children[0].text_content(), "Hi");
    }

    #[test]
    fn nested_directives() {
        let children = blocks(
            "::::outer\n:::inner\nx\n:::\ny\n::::",
            &ParseOptions::full(),
        );
        assert_eq!(children.len(), 1);
        let MstNode::ContainerDirective(outer) = &children[0] else {
            panic!("expected directive");
        };
        assert_eq!(outer.name, "outer");
        assert_eq!(outer.children.len(), 2);
        assert!(matches!(&outer.children[0], MstNode::ContainerDirective(d) if d.name == "inner"));
    }

    #[test]
    fn label_is_parsed_inline() {
        let children = blocks(":::note[Be *careful*]\nbody\n:::", &ParseOptions::full());
        let MstNode::ContainerDirective(directive) = &children[0] else {
            panic!("expected directive");
        };
        let label = directive.label.as_ref().unwrap();
        assert!(label.iter().any(|n| matches!(n, MstNode::Emphasis(_))));
    }

    #[test]
    fn stray_closer_is_literal_text() {
        let children = blocks("Hello\n\n:::", &ParseOptions::full());
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].text_content(), ":::");
    }

    #[test]
    fn unclosed_directive_wraps_rest() {
        let children = blocks("before\n\n:::center\nA\n\nB", &ParseOptions::full());
        assert_eq!(children.len(), 2);
        let MstNode::ContainerDirective(directive) = &children[1] else {
            panic!("expected directive");
        };
        assert_eq!(directive.children.len(), 2);
    }

    #[test]
    fn directive_inside_list_item() {
        let children = blocks("- item\n  :::center\n  Hi\n  :::", &ParseOptions::full());
        let MstNode::List { children: items, .. } = &children[0] else {
            panic!("expected list, got {:?}", children[0]);
        };
        let item = items[0].children().unwrap();
        assert_eq!(item.len(), 2);
        assert!(matches!(&item[1], MstNode::ContainerDirective(d) if d.name == "center"));
    }

    #[test]
    fn unclosed_directive_in_list_leaves_no_stray_text() {
        let children = blocks("- item\n  :::center\n  Hi", &ParseOptions::full());
        assert_eq!(children.len(), 1);
        assert!(!children[0].text_content().contains(":::"));
    }

    #[test]
    fn directive_inside_nested_list_item() {
        let children = blocks("- a\n  - b\n    :::center\n    Hi\n    :::", &ParseOptions::feed());
        assert!(!children[0].text_content().contains(":::"));
        let MstNode::List { children: outer, .. } = &children[0] else {
            panic!("expected list, got {:?}", children[0]);
        };
        let outer_item = outer[0].children().unwrap();
        let MstNode::List { children: inner, .. } = &outer_item[1] else {
            panic!("expected nested list, got {:?}", outer_item[1]);
        };
        let inner_item = inner[0].children().unwrap();
        assert!(matches!(&inner_item[1], MstNode::ContainerDirective(d) if d.name == "center"));
    }

    #[test]
    fn marker_lookalike_text_is_kept() {
        let children = blocks("MDPRESSDIRECTIVE0OPEN", &ParseOptions::full());
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].text_content(), "MDPRESSDIRECTIVE0OPEN");
    }

    #[test]
    fn raw_html_block_keeps_fence_lines() {
        let children = blocks("<pre>\n:::center\nHi\n:::\n</pre>\n", &ParseOptions::feed());
        assert_eq!(
            children,
            vec![MstNode::Html("<pre>\n:::center\nHi\n:::\n</pre>".to_string())]
        );
    }

    #[test]
    fn footnotes_resolve_across_directives() {
        let children = blocks(
            ":::center\nText[^a]\n:::\n\n[^a]: Note.",
            &ParseOptions::full(),
        );
        assert!(matches!(children[0], MstNode::ContainerDirective(_)));
        assert!(
            children
                .iter()
                .any(|n| matches!(n, MstNode::FootnoteDefinition { identifier, .. } if identifier == "a"))
        );
    }

    #[test]
    fn alerts_only_in_full_mode() {
        let input = "> [!WARNING]\n> Careful";
        let full = blocks(input, &ParseOptions::full());
        assert!(matches!(
            full[0],
            MstNode::Alert {
                kind: AlertKind::Warning,
                ..
            }
        ));
        let feed = blocks(input, &ParseOptions::feed());
        assert!(matches!(feed[0], MstNode::Blockquote(_)));
    }

    #[test]
    fn feed_mode_keeps_dollars_as_text() {
        let children = blocks("costs $5 and $6", &ParseOptions::feed());
        assert_eq!(children[0].text_content(), "costs $5 and $6");
    }

    #[test]
    fn pipeline_runs_transforms() {
        let mut pipeline = ParserPipeline::new(ParseOptions::full());
        pipeline.push_transform(|root: &mut MstNode| {
            if let Some(children) = root.children_mut() {
                children.push(MstNode::ThematicBreak);
            }
        });
        let root = pipeline.parse("text").unwrap();
        assert_eq!(root.children().unwrap().last(), Some(&MstNode::ThematicBreak));
    }
}

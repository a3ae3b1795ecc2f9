//! Markdown syntax tree (MST).
//!
//! A closed sum type over the Markdown constructs the pipeline understands.
//! It is built from markdown-rs's mdast by [`MstNode::from_mdast`]: link and
//! image references are resolved against their definitions, definitions
//! themselves are dropped, and directive markers are regrouped into
//! [`MstNode::ContainerDirective`] nodes.

use std::collections::HashMap;

use markdown::mdast::{self, Node};

use crate::alert::AlertKind;
use crate::directives::{MarkedSource, Marker};

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// No explicit alignment.
    None,
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
}

impl Align {
    /// Value for the HTML `align` attribute.
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Center => Some("center"),
            Align::Right => Some("right"),
        }
    }
}

impl From<mdast::AlignKind> for Align {
    fn from(kind: mdast::AlignKind) -> Self {
        match kind {
            mdast::AlignKind::Left => Align::Left,
            mdast::AlignKind::Center => Align::Center,
            mdast::AlignKind::Right => Align::Right,
            mdast::AlignKind::None => Align::None,
        }
    }
}

/// Element a directive renders as, assigned by the directive transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    /// HTML tag name.
    pub tag: String,
    /// Class attribute, if any.
    pub class: Option<String>,
}

/// A `:::name` container directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Directive name as written after the colons.
    pub name: String,
    /// Optional `[label]` content, parsed as inline Markdown.
    pub label: Option<Vec<MstNode>>,
    /// Attributes from `{...}` in source order.
    pub attributes: Vec<(String, String)>,
    /// Body content.
    pub children: Vec<MstNode>,
    /// Render metadata; `None` renders as a plain `div`.
    pub wrapper: Option<Wrapper>,
}

/// A node of the Markdown syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MstNode {
    /// Document root.
    Root(Vec<MstNode>),
    /// Paragraph.
    Paragraph(Vec<MstNode>),
    /// ATX or setext heading.
    Heading {
        /// Level 1-6.
        depth: u8,
        /// Inline content.
        children: Vec<MstNode>,
    },
    /// `*emphasis*`
    Emphasis(Vec<MstNode>),
    /// `**strong**`
    Strong(Vec<MstNode>),
    /// `~~strikethrough~~`
    Delete(Vec<MstNode>),
    /// `` `code` ``
    InlineCode(String),
    /// Fenced or indented code block.
    Code {
        /// Language from the info string.
        lang: Option<String>,
        /// Rest of the info string.
        meta: Option<String>,
        /// Code text without the trailing newline.
        value: String,
    },
    /// Link (inline, reference or autolink).
    Link {
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
        /// Link text.
        children: Vec<MstNode>,
    },
    /// Image (inline or reference).
    Image {
        /// Source.
        url: String,
        /// Alternative text.
        alt: String,
        /// Optional title.
        title: Option<String>,
    },
    /// Ordered or unordered list.
    List {
        /// `ol` when true.
        ordered: bool,
        /// Start number of ordered lists.
        start: Option<u32>,
        /// Loose list.
        spread: bool,
        /// List items.
        children: Vec<MstNode>,
    },
    /// List item.
    ListItem {
        /// Blank lines between the item's children.
        spread: bool,
        /// Task list state.
        checked: Option<bool>,
        /// Item content.
        children: Vec<MstNode>,
    },
    /// GFM table; the first row is the header.
    Table {
        /// Column alignments.
        align: Vec<Align>,
        /// Rows.
        children: Vec<MstNode>,
    },
    /// Table row.
    TableRow(Vec<MstNode>),
    /// Table cell.
    TableCell(Vec<MstNode>),
    /// `> quote`
    Blockquote(Vec<MstNode>),
    /// Raw HTML fragment, kept verbatim.
    Html(String),
    /// Text leaf.
    Text(String),
    /// Hard line break.
    Break,
    /// `---`
    ThematicBreak,
    /// `$x$`
    InlineMath(String),
    /// `$$ … $$` on its own lines.
    Math(String),
    /// `[^id]`
    FootnoteReference {
        /// Normalized identifier.
        identifier: String,
        /// Label as written.
        label: Option<String>,
    },
    /// `[^id]: …`
    FootnoteDefinition {
        /// Normalized identifier.
        identifier: String,
        /// Label as written.
        label: Option<String>,
        /// Definition content.
        children: Vec<MstNode>,
    },
    /// `:::name … :::`
    ContainerDirective(Directive),
    /// Blockquote starting with `[!KEYWORD]`.
    Alert {
        /// Recognized keyword.
        kind: AlertKind,
        /// Content after the keyword line.
        children: Vec<MstNode>,
    },
}

impl MstNode {
    /// Child nodes, for container kinds.
    pub fn children(&self) -> Option<&[MstNode]> {
        match self {
            MstNode::Root(children)
            | MstNode::Paragraph(children)
            | MstNode::Emphasis(children)
            | MstNode::Strong(children)
            | MstNode::Delete(children)
            | MstNode::TableRow(children)
            | MstNode::TableCell(children)
            | MstNode::Blockquote(children)
            | MstNode::Heading { children, .. }
            | MstNode::Link { children, .. }
            | MstNode::List { children, .. }
            | MstNode::ListItem { children, .. }
            | MstNode::Table { children, .. }
            | MstNode::FootnoteDefinition { children, .. }
            | MstNode::Alert { children, .. } => Some(children),
            MstNode::ContainerDirective(directive) => Some(&directive.children),
            _ => None,
        }
    }

    /// Mutable child nodes, for container kinds.
    pub fn children_mut(&mut self) -> Option<&mut Vec<MstNode>> {
        match self {
            MstNode::Root(children)
            | MstNode::Paragraph(children)
            | MstNode::Emphasis(children)
            | MstNode::Strong(children)
            | MstNode::Delete(children)
            | MstNode::TableRow(children)
            | MstNode::TableCell(children)
            | MstNode::Blockquote(children)
            | MstNode::Heading { children, .. }
            | MstNode::Link { children, .. }
            | MstNode::List { children, .. }
            | MstNode::ListItem { children, .. }
            | MstNode::Table { children, .. }
            | MstNode::FootnoteDefinition { children, .. }
            | MstNode::Alert { children, .. } => Some(children),
            MstNode::ContainerDirective(directive) => Some(&mut directive.children),
            _ => None,
        }
    }

    /// Plain text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }

    /// Converts a markdown-rs tree, resolving references against definitions.
    pub fn from_mdast(root: &Node) -> MstNode {
        let mut definitions = HashMap::new();
        collect_definitions(root, &mut definitions);
        let builder = Builder { definitions };
        builder
            .node(root)
            .unwrap_or_else(|| MstNode::Root(Vec::new()))
    }
}

fn collect_text(node: &MstNode, out: &mut String) {
    match node {
        MstNode::Text(value)
        | MstNode::InlineCode(value)
        | MstNode::InlineMath(value)
        | MstNode::Math(value) => out.push_str(value),
        MstNode::Code { value, .. } => out.push_str(value),
        MstNode::Image { alt, .. } => out.push_str(alt),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_text(child, out);
                }
            }
        }
    }
}

/// Link reference definition target.
struct Definition {
    url: String,
    title: Option<String>,
}

fn collect_definitions(node: &Node, definitions: &mut HashMap<String, Definition>) {
    if let Node::Definition(def) = node {
        // First definition wins, as in CommonMark.
        definitions
            .entry(def.identifier.clone())
            .or_insert_with(|| Definition {
                url: def.url.clone(),
                title: def.title.clone(),
            });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, definitions);
        }
    }
}

struct Builder {
    definitions: HashMap<String, Definition>,
}

impl Builder {
    fn nodes(&self, nodes: &[Node]) -> Vec<MstNode> {
        nodes.iter().filter_map(|node| self.node(node)).collect()
    }

    fn node(&self, node: &Node) -> Option<MstNode> {
        let converted = match node {
            Node::Root(root) => MstNode::Root(self.nodes(&root.children)),
            Node::Paragraph(p) => MstNode::Paragraph(self.nodes(&p.children)),
            Node::Heading(h) => MstNode::Heading {
                depth: h.depth,
                children: self.nodes(&h.children),
            },
            Node::Emphasis(e) => MstNode::Emphasis(self.nodes(&e.children)),
            Node::Strong(s) => MstNode::Strong(self.nodes(&s.children)),
            Node::Delete(d) => MstNode::Delete(self.nodes(&d.children)),
            Node::InlineCode(code) => MstNode::InlineCode(code.value.clone()),
            Node::Code(code) => MstNode::Code {
                lang: code.lang.clone(),
                meta: code.meta.clone(),
                value: code.value.clone(),
            },
            Node::Link(link) => MstNode::Link {
                url: link.url.clone(),
                title: link.title.clone(),
                children: self.nodes(&link.children),
            },
            Node::LinkReference(reference) => {
                let children = self.nodes(&reference.children);
                match self.definitions.get(&reference.identifier) {
                    Some(def) => MstNode::Link {
                        url: def.url.clone(),
                        title: def.title.clone(),
                        children,
                    },
                    // Unresolvable: keep the bracketed text.
                    None => MstNode::Text(format!(
                        "[{}]",
                        children.iter().map(MstNode::text_content).collect::<String>()
                    )),
                }
            }
            Node::Image(image) => MstNode::Image {
                url: image.url.clone(),
                alt: image.alt.clone(),
                title: image.title.clone(),
            },
            Node::ImageReference(reference) => match self.definitions.get(&reference.identifier) {
                Some(def) => MstNode::Image {
                    url: def.url.clone(),
                    alt: reference.alt.clone(),
                    title: def.title.clone(),
                },
                None => MstNode::Text(format!("![{}]", reference.alt)),
            },
            Node::List(list) => MstNode::List {
                ordered: list.ordered,
                start: list.start,
                spread: list.spread,
                children: self.nodes(&list.children),
            },
            Node::ListItem(item) => MstNode::ListItem {
                spread: item.spread,
                checked: item.checked,
                children: self.nodes(&item.children),
            },
            Node::Table(table) => MstNode::Table {
                align: table.align.iter().copied().map(Align::from).collect(),
                children: self.nodes(&table.children),
            },
            Node::TableRow(row) => MstNode::TableRow(self.nodes(&row.children)),
            Node::TableCell(cell) => MstNode::TableCell(self.nodes(&cell.children)),
            Node::Blockquote(quote) => MstNode::Blockquote(self.nodes(&quote.children)),
            Node::Html(html) => MstNode::Html(html.value.clone()),
            Node::Text(text) => MstNode::Text(text.value.clone()),
            Node::Break(_) => MstNode::Break,
            Node::ThematicBreak(_) => MstNode::ThematicBreak,
            Node::InlineMath(math) => MstNode::InlineMath(math.value.clone()),
            Node::Math(math) => MstNode::Math(math.value.clone()),
            Node::FootnoteReference(reference) => MstNode::FootnoteReference {
                identifier: reference.identifier.clone(),
                label: reference.label.clone(),
            },
            Node::FootnoteDefinition(def) => MstNode::FootnoteDefinition {
                identifier: def.identifier.clone(),
                label: def.label.clone(),
                children: self.nodes(&def.children),
            },
            Node::Definition(_) => return None,
            other => {
                log::warn!("Unhandled markdown node type: {:?}", other);
                return None;
            }
        };
        Some(converted)
    }
}

/// Regroups directive marker paragraphs into [`MstNode::ContainerDirective`] nodes.
///
/// Grouping happens independently inside every container. An opener whose
/// closer landed in another container is closed at the end of its own
/// container; a closer without its opener becomes literal text.
pub fn regroup_directives(node: &mut MstNode, marked: &MarkedSource, labels: &LabelParser<'_>) {
    let Some(children) = node.children_mut() else {
        return;
    };
    for child in children.iter_mut() {
        regroup_directives(child, marked, labels);
    }
    if !children.iter().any(|child| marker_of(child, marked).is_some()) {
        return;
    }

    let mut out: Vec<MstNode> = Vec::with_capacity(children.len());
    let mut stack: Vec<(usize, Vec<MstNode>)> = Vec::new();

    for child in children.drain(..) {
        match marker_of(&child, marked) {
            Some(Marker::Open(index)) => stack.push((index, Vec::new())),
            Some(Marker::Close(index)) => {
                match stack.iter().rposition(|(open, _)| *open == index) {
                    Some(position) => {
                        while stack.len() > position {
                            close_top(&mut stack, &mut out, marked, labels);
                        }
                    }
                    // Closers synthesized at end of input have no source text.
                    None if marked.closers.get(index).is_some_and(Option::is_none) => {}
                    None => {
                        let literal = literal_paragraph(marked.original_text(Marker::Close(index)));
                        push_child(&mut stack, &mut out, literal);
                    }
                }
            }
            None => push_child(&mut stack, &mut out, child),
        }
    }
    while !stack.is_empty() {
        close_top(&mut stack, &mut out, marked, labels);
    }

    *children = out;
}

/// Parses directive labels as inline Markdown.
pub struct LabelParser<'a> {
    options: &'a markdown::ParseOptions,
}

impl<'a> LabelParser<'a> {
    /// Creates a label parser using the document's parse options.
    pub fn new(options: &'a markdown::ParseOptions) -> Self {
        Self { options }
    }

    /// Parses a label into inline nodes; falls back to plain text.
    pub fn parse(&self, label: &str) -> Vec<MstNode> {
        match markdown::to_mdast(label, self.options) {
            Ok(tree) => match MstNode::from_mdast(&tree) {
                MstNode::Root(mut blocks) if blocks.len() == 1 => match blocks.remove(0) {
                    MstNode::Paragraph(inline) => inline,
                    other => vec![other],
                },
                _ => vec![MstNode::Text(label.to_string())],
            },
            Err(_) => vec![MstNode::Text(label.to_string())],
        }
    }
}

fn marker_of(node: &MstNode, marked: &MarkedSource) -> Option<Marker> {
    match node {
        MstNode::Paragraph(children) => match children.as_slice() {
            [MstNode::Text(text)] => marked.parse_marker(text),
            _ => None,
        },
        _ => None,
    }
}

fn push_child(stack: &mut [(usize, Vec<MstNode>)], out: &mut Vec<MstNode>, child: MstNode) {
    match stack.last_mut() {
        Some((_, body)) => body.push(child),
        None => out.push(child),
    }
}

fn close_top(
    stack: &mut Vec<(usize, Vec<MstNode>)>,
    out: &mut Vec<MstNode>,
    marked: &MarkedSource,
    labels: &LabelParser<'_>,
) {
    let Some((index, children)) = stack.pop() else {
        return;
    };
    let node = match marked.openings.get(index) {
        Some(opening) => MstNode::ContainerDirective(Directive {
            name: opening.name.clone(),
            label: opening.label.as_deref().map(|label| labels.parse(label)),
            attributes: opening.attributes.clone(),
            children,
            wrapper: None,
        }),
        None => {
            let mut nodes = vec![literal_paragraph(marked.original_text(Marker::Open(index)))];
            nodes.extend(children);
            for node in nodes {
                push_child(stack, out, node);
            }
            return;
        }
    };
    push_child(stack, out, node);
}

fn literal_paragraph(text: String) -> MstNode {
    MstNode::Paragraph(vec![MstNode::Text(text)])
}

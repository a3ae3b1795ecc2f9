//! Tree converter: MST to HST.
//!
//! Structure is preserved node for node, with two exceptions: paragraphs
//! inside tight list items are unwrapped, and footnote definitions are
//! pulled out of the flow into one trailing `section.footnotes`.

use std::collections::HashMap;

use mdpress_core::{Directive, MstNode};

use crate::FOOTNOTE_ID_PREFIX;
use crate::hst::{Element, HstNode};

/// Options affecting conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Emit raw HTML verbatim; when false it becomes escaped text.
    pub allow_raw_html: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: true,
        }
    }
}

/// Converts an MST into an HST fragment root.
pub fn to_html_tree(root: &MstNode, options: &ConvertOptions) -> HstNode {
    let mut ctx = Context::new(root, options);
    let mut children = ctx.nodes(match root {
        MstNode::Root(children) => children.as_slice(),
        other => std::slice::from_ref(other),
    });
    if let Some(section) = ctx.finish() {
        children.push(section);
    }
    HstNode::Root(children)
}

/// Replaces characters outside `[A-Za-z0-9_-]` with `-`.
pub fn footnote_safe_id(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

struct Context<'a> {
    options: &'a ConvertOptions,
    definitions: HashMap<&'a str, &'a [MstNode]>,
    /// Footnote identifiers in order of first reference.
    footnote_order: Vec<&'a str>,
    /// Reference count per identifier.
    footnote_refs: HashMap<&'a str, usize>,
}

impl<'a> Context<'a> {
    fn new(root: &'a MstNode, options: &'a ConvertOptions) -> Self {
        let mut definitions = HashMap::new();
        collect_footnote_definitions(root, &mut definitions);
        Self {
            options,
            definitions,
            footnote_order: Vec::new(),
            footnote_refs: HashMap::new(),
        }
    }

    fn nodes(&mut self, nodes: &'a [MstNode]) -> Vec<HstNode> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.node(node, &mut out);
        }
        out
    }

    fn element(&mut self, tag: &str, children: &'a [MstNode]) -> HstNode {
        Element::new(tag).with_children(self.nodes(children)).into()
    }

    fn node(&mut self, node: &'a MstNode, out: &mut Vec<HstNode>) {
        let converted = match node {
            MstNode::Root(children) => {
                out.extend(self.nodes(children));
                return;
            }
            MstNode::Paragraph(children) => self.element("p", children),
            MstNode::Heading { depth, children } => {
                let tag = format!("h{}", (*depth).clamp(1, 6));
                self.element(&tag, children)
            }
            MstNode::Emphasis(children) => self.element("em", children),
            MstNode::Strong(children) => self.element("strong", children),
            MstNode::Delete(children) => self.element("del", children),
            MstNode::InlineCode(value) => Element::new("code").child(HstNode::text(value)).into(),
            MstNode::Code { lang, value, .. } => code_block(lang.as_deref(), value),
            MstNode::Link {
                url,
                title,
                children,
            } => {
                let mut link = Element::new("a").attr("href", url);
                if let Some(title) = title {
                    link = link.attr("title", title);
                }
                link.with_children(self.nodes(children)).into()
            }
            MstNode::Image { url, alt, title } => {
                let mut image = Element::new("img").attr("src", url).attr("alt", alt);
                if let Some(title) = title {
                    image = image.attr("title", title);
                }
                image.into()
            }
            MstNode::List {
                ordered,
                start,
                spread,
                children,
            } => self.list(*ordered, *start, *spread, children),
            MstNode::ListItem { .. } => self.list_item(node, false),
            MstNode::Table { align, children } => self.table(align, children),
            MstNode::TableRow(children) => self.element("tr", children),
            MstNode::TableCell(children) => self.element("td", children),
            MstNode::Blockquote(children) => self.element("blockquote", children),
            MstNode::Html(value) => {
                if self.options.allow_raw_html {
                    HstNode::Raw(value.clone())
                } else {
                    log::debug!("escaping raw HTML fragment ({} bytes)", value.len());
                    HstNode::text(value)
                }
            }
            MstNode::Text(value) => HstNode::text(value),
            MstNode::Break => Element::new("br").into(),
            MstNode::ThematicBreak => Element::new("hr").into(),
            MstNode::InlineMath(value) => Element::new("code")
                .attr("class", "language-math math-inline")
                .child(HstNode::text(value))
                .into(),
            MstNode::Math(value) => Element::new("pre")
                .child(
                    Element::new("code")
                        .attr("class", "language-math math-display")
                        .child(HstNode::text(value))
                        .into(),
                )
                .into(),
            MstNode::FootnoteReference { identifier, label } => {
                self.footnote_reference(identifier, label.as_deref())
            }
            // Collected up front and emitted by `finish`.
            MstNode::FootnoteDefinition { .. } => return,
            MstNode::ContainerDirective(directive) => self.directive(directive),
            MstNode::Alert { kind, children } => {
                let mut alert = Element::new("div")
                    .attr(
                        "class",
                        format!("markdown-alert markdown-alert-{}", kind.class_suffix()),
                    )
                    .attr("data-alert", kind.as_str())
                    .child(
                        Element::new("p")
                            .attr("class", "markdown-alert-title")
                            .child(HstNode::text(kind.title()))
                            .into(),
                    );
                alert.children.extend(self.nodes(children));
                alert.into()
            }
        };
        out.push(converted);
    }

    fn list(
        &mut self,
        ordered: bool,
        start: Option<u32>,
        spread: bool,
        items: &'a [MstNode],
    ) -> HstNode {
        let loose = spread
            || items
                .iter()
                .any(|item| matches!(item, MstNode::ListItem { spread: true, .. }));
        let mut list = Element::new(if ordered { "ol" } else { "ul" });
        if ordered && let Some(start) = start.filter(|start| *start != 1) {
            list = list.attr("start", start.to_string());
        }
        if items
            .iter()
            .any(|item| matches!(item, MstNode::ListItem { checked: Some(_), .. }))
        {
            list = list.attr("class", "contains-task-list");
        }
        for item in items {
            let converted = self.list_item(item, !loose);
            list.children.push(converted);
        }
        list.into()
    }

    fn list_item(&mut self, item: &'a MstNode, tight: bool) -> HstNode {
        let MstNode::ListItem {
            checked, children, ..
        } = item
        else {
            let mut out = Vec::new();
            self.node(item, &mut out);
            return Element::new("li").with_children(out).into();
        };

        let mut li = Element::new("li");
        for child in children {
            match child {
                MstNode::Paragraph(inline) if tight => li.children.extend(self.nodes(inline)),
                _ => self.node(child, &mut li.children),
            }
        }

        if let Some(checked) = checked {
            li = li.attr("class", "task-list-item");
            let mut checkbox = Element::new("input")
                .attr("type", "checkbox")
                .attr("disabled", "");
            if *checked {
                checkbox = checkbox.attr("checked", "");
            }
            match li.children.first_mut() {
                Some(HstNode::Element(p)) if p.tag == "p" => {
                    prepend_checkbox(&mut p.children, checkbox)
                }
                _ => prepend_checkbox(&mut li.children, checkbox),
            }
        }
        li.into()
    }

    fn table(&mut self, align: &[mdpress_core::Align], rows: &'a [MstNode]) -> HstNode {
        let mut table = Element::new("table");
        let mut body = Element::new("tbody");
        for (index, row) in rows.iter().enumerate() {
            let is_head = index == 0;
            let MstNode::TableRow(cells) = row else {
                continue;
            };
            let mut tr = Element::new("tr");
            for (column, cell) in cells.iter().enumerate() {
                let MstNode::TableCell(content) = cell else {
                    continue;
                };
                let mut cell_el = Element::new(if is_head { "th" } else { "td" });
                if let Some(value) = align.get(column).and_then(|a| a.as_attr()) {
                    cell_el = cell_el.attr("align", value);
                }
                tr.children
                    .push(cell_el.with_children(self.nodes(content)).into());
            }
            if is_head {
                table
                    .children
                    .push(Element::new("thead").child(tr.into()).into());
            } else {
                body.children.push(tr.into());
            }
        }
        if !body.children.is_empty() {
            table.children.push(body.into());
        }
        table.into()
    }

    fn directive(&mut self, directive: &'a Directive) -> HstNode {
        let mut element = match &directive.wrapper {
            Some(wrapper) => {
                let mut element = Element::new(wrapper.tag.as_str());
                if let Some(class) = &wrapper.class {
                    element = element.attr("class", class);
                }
                element
            }
            None => Element::new("div"),
        };
        for (key, value) in &directive.attributes {
            if key == "class" {
                for class in value.split_whitespace() {
                    element.add_class(class);
                }
            } else {
                element.attributes.set(key, value);
            }
        }
        if let Some(label) = &directive.label {
            element
                .children
                .push(Element::new("p").with_children(self.nodes(label)).into());
        }
        element.children.extend(self.nodes(&directive.children));
        element.into()
    }

    fn footnote_reference(&mut self, identifier: &'a str, label: Option<&str>) -> HstNode {
        if !self.definitions.contains_key(identifier) {
            return HstNode::text(format!("[^{}]", label.unwrap_or(identifier)));
        }

        let ordinal = match self.footnote_order.iter().position(|id| *id == identifier) {
            Some(index) => index + 1,
            None => {
                self.footnote_order.push(identifier);
                self.footnote_order.len()
            }
        };
        let count = self.footnote_refs.entry(identifier).or_insert(0);
        *count += 1;

        let safe_id = footnote_safe_id(identifier);
        let suffix = if *count == 1 {
            String::new()
        } else {
            format!("-{}", count)
        };

        Element::new("sup")
            .child(
                Element::new("a")
                    .attr("href", format!("#{FOOTNOTE_ID_PREFIX}fn-{safe_id}"))
                    .attr("id", format!("{FOOTNOTE_ID_PREFIX}fnref-{safe_id}{suffix}"))
                    .attr("data-footnote-ref", "")
                    .attr("aria-describedby", "footnote-label")
                    .child(HstNode::text(ordinal.to_string()))
                    .into(),
            )
            .into()
    }

    /// Builds the footnotes section, if anything was referenced.
    fn finish(&mut self) -> Option<HstNode> {
        if self.footnote_order.is_empty() {
            return None;
        }

        let mut list = Element::new("ol");
        // Definitions may reference further footnotes, which extends the order.
        let mut index = 0;
        while index < self.footnote_order.len() {
            let identifier = self.footnote_order[index];
            index += 1;
            let Some(children) = self.definitions.get(identifier).copied() else {
                continue;
            };
            let mut content = self.nodes(children);
            let count = self.footnote_refs.get(identifier).copied().unwrap_or(1);
            let safe_id = footnote_safe_id(identifier);

            let mut backrefs = Vec::new();
            for n in 1..=count {
                let (suffix, label_suffix) = if n == 1 {
                    (String::new(), String::new())
                } else {
                    (format!("-{n}"), format!("-{n}"))
                };
                let mut backref = Element::new("a")
                    .attr("href", format!("#{FOOTNOTE_ID_PREFIX}fnref-{safe_id}{suffix}"))
                    .attr("data-footnote-backref", "")
                    .attr(
                        "aria-label",
                        format!("Back to reference {index}{label_suffix}"),
                    )
                    .attr("class", "data-footnote-backref")
                    .child(HstNode::text("↩"));
                if n > 1 {
                    backref = backref.child(
                        Element::new("sup")
                            .child(HstNode::text(n.to_string()))
                            .into(),
                    );
                }
                backrefs.push(HstNode::text(" "));
                backrefs.push(backref.into());
            }

            match content.last_mut() {
                Some(HstNode::Element(p)) if p.tag == "p" => p.children.extend(backrefs),
                _ => content.extend(backrefs),
            }

            list.children.push(
                Element::new("li")
                    .attr("id", format!("{FOOTNOTE_ID_PREFIX}fn-{safe_id}"))
                    .with_children(content)
                    .into(),
            );
        }

        Some(
            Element::new("section")
                .attr("data-footnotes", "")
                .attr("class", "footnotes")
                .child(
                    Element::new("h2")
                        .attr("class", "sr-only")
                        .attr("id", "footnote-label")
                        .child(HstNode::text("Footnotes"))
                        .into(),
                )
                .child(list.into())
                .into(),
        )
    }
}

fn prepend_checkbox(children: &mut Vec<HstNode>, checkbox: Element) {
    if let Some(HstNode::Text(text)) = children.first_mut() {
        let trimmed = text.trim_start();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }
    children.splice(0..0, [checkbox.into(), HstNode::text(" ")]);
}

fn code_block(lang: Option<&str>, value: &str) -> HstNode {
    let mut code = Element::new("code");
    if let Some(lang) = lang {
        code = code.attr("class", format!("language-{lang}"));
    }
    if !value.is_empty() {
        code = code.child(HstNode::text(format!("{value}\n")));
    }
    Element::new("pre").child(code.into()).into()
}

fn collect_footnote_definitions<'a>(
    node: &'a MstNode,
    definitions: &mut HashMap<&'a str, &'a [MstNode]>,
) {
    if let MstNode::FootnoteDefinition {
        identifier,
        children,
        ..
    } = node
    {
        definitions
            .entry(identifier.as_str())
            .or_insert(children.as_slice());
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_footnote_definitions(child, definitions);
        }
    }
}

//! Container directive syntax (`:::name[label]{attrs}` … `:::`).
//!
//! markdown-rs has no directive construct, so directives are handled in two
//! steps. [`mark_directives`] rewrites every opener and closer line into a
//! standalone marker paragraph, the document is parsed once, and the MST
//! builder regroups the nodes between matching markers (see
//! [`crate::mst::regroup_directives`]). Parsing once keeps footnotes and
//! link definitions working across directive boundaries.

use std::fmt::Write as _;

use crate::code_fence::{FenceTracker, leading_indent};
use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};
use crate::html_block::HtmlBlockTracker;

const MARKER_PREFIX: &str = "MDPRESSDIRECTIVE";
const MIN_COLONS: usize = 3;

/// Parsed representation of a directive opening line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveOpening {
    /// Directive name as written (case preserved).
    pub name: String,
    /// Number of colons in the opening fence.
    pub colons: usize,
    /// Optional label captured from `[...]`.
    pub label: Option<String>,
    /// Attributes from `{...}` in source order; classes are merged into one `class` entry.
    pub attributes: Vec<(String, String)>,
    /// 1-indexed source line of the opener.
    pub line: usize,
}

/// A directive marker found in parsed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Start of the directive with the given opening index.
    Open(usize),
    /// End of the directive with the given opening index.
    Close(usize),
}

/// Markdown source with directive fences replaced by markers.
#[derive(Debug, Clone, Default)]
pub struct MarkedSource {
    /// Rewritten Markdown text.
    pub text: String,
    /// Openings indexed by marker number.
    pub openings: Vec<DirectiveOpening>,
    /// Original closer line for each opening, used when a marker cannot be matched.
    pub closers: Vec<Option<String>>,
    /// Unclosed and stray directive fences.
    pub diagnostics: ParseDiagnostics,
    /// Marker prefix chosen so that it does not occur in the input.
    pub marker_prefix: String,
}

impl MarkedSource {
    /// Formats the marker text for a directive event.
    pub fn marker_text(&self, marker: Marker) -> String {
        match marker {
            Marker::Open(index) => format!("{}{index}OPEN", self.marker_prefix),
            Marker::Close(index) => format!("{}{index}CLOSE", self.marker_prefix),
        }
    }

    /// Recognizes marker text produced by [`mark_directives`] for this document.
    ///
    /// Only indices of recorded openings are accepted.
    pub fn parse_marker(&self, text: &str) -> Option<Marker> {
        if self.marker_prefix.is_empty() {
            return None;
        }
        let rest = text.trim().strip_prefix(self.marker_prefix.as_str())?;
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let index: usize = rest[..digits].parse().ok()?;
        if index >= self.openings.len() {
            return None;
        }
        match &rest[digits..] {
            "OPEN" => Some(Marker::Open(index)),
            "CLOSE" => Some(Marker::Close(index)),
            _ => None,
        }
    }

    /// Returns the text a marker stood for in the original document.
    pub fn original_text(&self, marker: Marker) -> String {
        match marker {
            Marker::Open(index) => self
                .openings
                .get(index)
                .map(opening_source)
                .unwrap_or_default(),
            Marker::Close(index) => self
                .closers
                .get(index)
                .cloned()
                .flatten()
                .unwrap_or_else(|| ":::".to_string()),
        }
    }
}

/// Parses a directive opening line such as `:::note[Title]{.wide}`.
///
/// The line may be indented by at most three columns. The returned opening
/// has `line` set to 0; [`mark_directives`] fills in the real line number.
pub fn parse_opening_directive(line: &str) -> Option<DirectiveOpening> {
    let (columns, offset) = leading_indent(line);
    if columns > 3 {
        return None;
    }
    let text = line[offset..].trim_end();

    let colons = text.bytes().take_while(|b| *b == b':').count();
    if colons < MIN_COLONS {
        return None;
    }
    let rest = text[colons..].trim_start_matches([' ', '\t']);

    let name_len = directive_name_len(rest)?;
    let name = rest[..name_len].to_string();
    let mut rest = &rest[name_len..];

    let mut label = None;
    if rest.starts_with('[') {
        let (inner, after) = take_balanced(rest, '[', ']')?;
        label = Some(inner.to_string());
        rest = after;
    }

    let mut attributes = Vec::new();
    if rest.starts_with('{') {
        let (inner, after) = take_balanced(rest, '{', '}')?;
        attributes = parse_attributes(inner)?;
        rest = after;
    }

    if !rest.trim().is_empty() {
        return None;
    }

    Some(DirectiveOpening {
        name,
        colons,
        label,
        attributes,
        line: 0,
    })
}

/// Returns the colon count if the line is a bare directive closer (`:::`).
pub fn directive_closer_len(line: &str) -> Option<usize> {
    let (columns, offset) = leading_indent(line);
    if columns > 3 {
        return None;
    }
    let text = line[offset..].trim_end();
    (text.len() >= MIN_COLONS && text.bytes().all(|b| b == b':')).then_some(text.len())
}

/// Rewrites directive fences into marker paragraphs.
///
/// Lines inside fenced code or raw HTML blocks are copied unchanged.
/// Indentation is measured from the enclosing list item. A closer closes
/// the innermost open directive when it has at least as many colons as that
/// directive's opener; otherwise it stays literal text. Directives still
/// open at the end of input are closed there.
pub fn mark_directives(input: &str) -> MarkedSource {
    let mut marked = MarkedSource {
        text: String::with_capacity(input.len() + 64),
        marker_prefix: marker_prefix_for(input),
        ..MarkedSource::default()
    };
    let mut fences = FenceTracker::new();
    let mut html = HtmlBlockTracker::new();
    let mut lists = ListItems::default();
    // (opening index, indentation to reuse for the marker lines)
    let mut stack: Vec<(usize, String)> = Vec::new();
    // Directive depth at which the current raw HTML block started.
    let mut html_depth = 0;

    for (number, line) in input.lines().enumerate() {
        let number = number + 1;
        let base = if fences.open_fence().is_some() || html.is_open() {
            lists.content_column()
        } else {
            lists.observe(line)
        };
        let relative = strip_columns(line, base);

        if fences.observe(relative).is_code() {
            html.end_paragraph();
            writeln!(marked.text, "{}", line).ok();
            continue;
        }
        // A raw HTML block opened inside a directive ends at that directive's closer.
        let ends_html = html.is_open()
            && !stack.is_empty()
            && html_depth == stack.len()
            && closes_innermost(&stack, &marked.openings, relative);
        if ends_html {
            html.close();
        } else {
            let was_open = html.is_open();
            if html.observe(relative) {
                if !was_open {
                    html_depth = stack.len();
                }
                writeln!(marked.text, "{}", line).ok();
                continue;
            }
        }

        let indent: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();

        if let Some(mut opening) = parse_opening_directive(relative) {
            opening.line = number;
            let index = marked.openings.len();
            marked.openings.push(opening);
            marked.closers.push(None);
            let text = marked.marker_text(Marker::Open(index));
            push_marker(&mut marked.text, &indent, &text);
            html.end_paragraph();
            stack.push((index, indent));
            continue;
        }

        if directive_closer_len(relative).is_some() {
            if closes_innermost(&stack, &marked.openings, relative)
                && let Some((index, indent)) = stack.pop()
            {
                marked.closers[index] = Some(line.trim().to_string());
                let text = marked.marker_text(Marker::Close(index));
                push_marker(&mut marked.text, &indent, &text);
                html.end_paragraph();
                continue;
            }
            marked.diagnostics.add_warning(ParseWarning::StrayDirectiveCloser {
                location: SourceLocation::new(number, indent.len() + 1),
            });
        }

        writeln!(marked.text, "{}", line).ok();
    }

    if let Some(open) = fences.open_fence() {
        marked.diagnostics.add_warning(ParseWarning::UnclosedCodeFence {
            location: SourceLocation::new(open.line, 1),
            marker: open.marker,
        });
    }

    while let Some((index, indent)) = stack.pop() {
        let opening = &marked.openings[index];
        marked.diagnostics.add_warning(ParseWarning::UnclosedDirective {
            location: SourceLocation::new(opening.line, indent.len() + 1),
            name: opening.name.clone(),
        });
        let text = marked.marker_text(Marker::Close(index));
        push_marker(&mut marked.text, &indent, &text);
    }

    marked
}

/// Whether `line` is a closer for the innermost open directive.
fn closes_innermost(stack: &[(usize, String)], openings: &[DirectiveOpening], line: &str) -> bool {
    let Some(colons) = directive_closer_len(line) else {
        return false;
    };
    stack
        .last()
        .is_some_and(|(index, _)| openings[*index].colons <= colons)
}

/// Picks a marker prefix that cannot collide with document text.
fn marker_prefix_for(input: &str) -> String {
    let mut prefix = MARKER_PREFIX.to_string();
    while input.contains(prefix.as_str()) {
        prefix.push('X');
    }
    prefix
}

/// Content columns of the list items enclosing the current line.
#[derive(Debug, Default)]
struct ListItems {
    content_columns: Vec<usize>,
}

impl ListItems {
    fn content_column(&self) -> usize {
        self.content_columns.last().copied().unwrap_or(0)
    }

    /// Updates the open items for `line` and returns the column its content
    /// is measured from.
    fn observe(&mut self, line: &str) -> usize {
        if line.trim().is_empty() {
            return self.content_column();
        }
        let (columns, offset) = leading_indent(line);
        while self
            .content_columns
            .last()
            .is_some_and(|content| *content > columns)
        {
            self.content_columns.pop();
        }
        let base = self.content_column();
        if columns - base <= 3
            && let Some(width) = list_marker_width(&line[offset..])
        {
            self.content_columns.push(columns + width);
        }
        base
    }
}

/// Width of a list marker plus its following spaces, if `text` starts a list item.
fn list_marker_width(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let marker_len = match *bytes.first()? {
        b'-' | b'+' | b'*' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };
    let after = &text[marker_len..];
    if after.trim().is_empty() {
        return Some(marker_len + 1);
    }
    if !after.starts_with([' ', '\t']) || is_thematic_break(text) {
        return None;
    }
    let spaces = after.bytes().take_while(|b| *b == b' ').count();
    // Five or more spaces start indented code; the item content begins after one.
    Some(marker_len + if (1..=4).contains(&spaces) { spaces } else { 1 })
}

fn is_thematic_break(text: &str) -> bool {
    let mut chars = text.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.next() else {
        return false;
    };
    matches!(first, '-' | '*' | '_') && 1 + chars.clone().count() >= 3 && chars.all(|c| c == first)
}

/// Drops up to `columns` columns of leading whitespace.
fn strip_columns(line: &str, columns: usize) -> &str {
    let mut seen = 0;
    for (offset, b) in line.bytes().enumerate() {
        if seen >= columns {
            return &line[offset..];
        }
        match b {
            b' ' => seen += 1,
            b'\t' => seen += 4 - (seen % 4),
            _ => return &line[offset..],
        }
    }
    ""
}

/// Marker lines are surrounded by blank lines so each becomes its own paragraph.
fn push_marker(out: &mut String, indent: &str, marker: &str) {
    writeln!(out).ok();
    writeln!(out, "{}{}", indent, marker).ok();
    writeln!(out).ok();
}

fn opening_source(opening: &DirectiveOpening) -> String {
    let mut source = ":".repeat(opening.colons);
    source.push_str(&opening.name);
    if let Some(label) = &opening.label {
        write!(source, "[{}]", label).ok();
    }
    if !opening.attributes.is_empty() {
        let attrs: Vec<String> = opening
            .attributes
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, value))
            .collect();
        write!(source, "{{{}}}", attrs.join(" ")).ok();
    }
    source
}

/// Name: an ASCII letter followed by letters, digits, `-` or `_`.
fn directive_name_len(text: &str) -> Option<usize> {
    let first = text.bytes().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    Some(
        text.bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
            .count(),
    )
}

/// Splits `open … close` (with nesting) off the front of `text`.
fn take_balanced(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (index, ch) in text.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some((&text[1..index], &text[index + 1..]));
            }
        }
    }
    None
}

/// Parses `#id .class key=value key="quoted value"` attribute lists.
fn parse_attributes(inner: &str) -> Option<Vec<(String, String)>> {
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut classes: Vec<String> = Vec::new();
    let mut chars = inner.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch == '#' || ch == '.' {
            chars.next();
            let mut value = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_whitespace() || c == '#' || c == '.' {
                    break;
                }
                value.push(c);
                chars.next();
            }
            if value.is_empty() {
                return None;
            }
            if ch == '#' {
                set_attribute(&mut attributes, "id", value);
            } else {
                classes.push(value);
            }
            continue;
        }

        let mut key_end = start;
        while let Some(&(index, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            key_end = index + c.len_utf8();
            chars.next();
        }
        let key = &inner[start..key_end];
        if key.is_empty() {
            return None;
        }

        let mut value = String::new();
        if let Some(&(_, '=')) = chars.peek() {
            chars.next();
            match chars.peek() {
                Some(&(_, quote @ ('"' | '\''))) => {
                    chars.next();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == quote {
                            closed = true;
                            break;
                        }
                        value.push(c);
                    }
                    if !closed {
                        return None;
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        if key == "class" {
            classes.extend(value.split_whitespace().map(str::to_string));
        } else {
            set_attribute(&mut attributes, key, value);
        }
    }

    if !classes.is_empty() {
        set_attribute(&mut attributes, "class", classes.join(" "));
    }
    Some(attributes)
}

fn set_attribute(attributes: &mut Vec<(String, String)>, key: &str, value: String) {
    match attributes.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value,
        None => attributes.push((key.to_string(), value)),
    }
}

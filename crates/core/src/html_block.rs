//! Raw HTML block tracking for line-oriented pre-passes.
//!
//! Mirrors the CommonMark HTML block start and end conditions closely enough
//! that the directive pre-pass can leave raw HTML bytes alone.

/// Tags whose blocks run until the matching closing tag, across blank lines.
const VERBATIM_TAGS: &[&str] = &["pre", "script", "style", "textarea"];
const VERBATIM_CLOSERS: &[&str] = &["</pre>", "</script>", "</style>", "</textarea>"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockEnd {
    /// Ends on the line containing any of these (ASCII case-insensitive).
    Contains(&'static [&'static str]),
    /// Ends before the next blank line.
    BlankLine,
}

/// Tracks raw HTML blocks across lines.
///
/// Lines must be given relative to their container (list item indentation
/// already removed) and only when they are outside fenced code.
#[derive(Debug, Clone, Default)]
pub struct HtmlBlockTracker {
    open: Option<BlockEnd>,
    in_paragraph: bool,
}

impl HtmlBlockTracker {
    /// Creates a tracker positioned before the first line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a raw HTML block is still open.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Ends the open block, if any.
    pub fn close(&mut self) {
        self.open = None;
        self.in_paragraph = false;
    }

    /// Marks the end of any running paragraph (after code fences or
    /// generated blank lines).
    pub fn end_paragraph(&mut self) {
        self.in_paragraph = false;
    }

    /// Classifies the next line; returns `true` when it belongs to a raw HTML block.
    pub fn observe(&mut self, line: &str) -> bool {
        let blank = line.trim().is_empty();
        if let Some(end) = self.open {
            match end {
                BlockEnd::BlankLine if blank => {
                    self.open = None;
                    self.in_paragraph = false;
                    return false;
                }
                BlockEnd::BlankLine => {}
                BlockEnd::Contains(closers) => {
                    if contains_any(line, closers) {
                        self.open = None;
                    }
                }
            }
            return true;
        }

        if blank {
            self.in_paragraph = false;
            return false;
        }

        match block_start(line, self.in_paragraph) {
            Some(BlockEnd::Contains(closers)) => {
                if !contains_any(line, closers) {
                    self.open = Some(BlockEnd::Contains(closers));
                }
                self.in_paragraph = false;
                true
            }
            Some(BlockEnd::BlankLine) => {
                self.open = Some(BlockEnd::BlankLine);
                self.in_paragraph = false;
                true
            }
            None => {
                self.in_paragraph = true;
                false
            }
        }
    }
}

fn block_start(line: &str, in_paragraph: bool) -> Option<BlockEnd> {
    let indent = line.bytes().take_while(|b| *b == b' ').count();
    if indent > 3 {
        return None;
    }
    let text = &line[indent..];
    let rest = text.strip_prefix('<')?;

    if rest.starts_with("!--") {
        return Some(BlockEnd::Contains(&["-->"]));
    }
    if rest.starts_with('?') {
        return Some(BlockEnd::Contains(&["?>"]));
    }
    if rest.starts_with("![CDATA[") {
        return Some(BlockEnd::Contains(&["]]>"]));
    }
    if rest
        .strip_prefix('!')
        .and_then(|after| after.bytes().next())
        .is_some_and(|b| b.is_ascii_alphabetic())
    {
        return Some(BlockEnd::Contains(&[">"]));
    }

    let (closing, after_slash) = match rest.strip_prefix('/') {
        Some(after) => (true, after),
        None => (false, rest),
    };
    let name_len = after_slash
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
        .count();
    if name_len == 0 || !after_slash.as_bytes()[0].is_ascii_alphabetic() {
        return None;
    }
    let name = after_slash[..name_len].to_ascii_lowercase();
    let after_name = &after_slash[name_len..];

    if !closing
        && VERBATIM_TAGS.contains(&name.as_str())
        && (after_name.is_empty() || after_name.starts_with([' ', '\t', '>']))
    {
        return Some(BlockEnd::Contains(VERBATIM_CLOSERS));
    }

    if BLOCK_TAGS.contains(&name.as_str())
        && (after_name.is_empty()
            || after_name.starts_with([' ', '\t', '>'])
            || after_name.starts_with("/>"))
    {
        return Some(BlockEnd::BlankLine);
    }

    if !in_paragraph && !VERBATIM_TAGS.contains(&name.as_str()) && complete_tag(after_name, closing)
    {
        return Some(BlockEnd::BlankLine);
    }
    None
}

/// A complete open or closing tag followed only by whitespace.
fn complete_tag(after_name: &str, closing: bool) -> bool {
    if closing {
        return after_name
            .trim_start()
            .strip_prefix('>')
            .is_some_and(|tail| tail.trim().is_empty());
    }
    if !(after_name.is_empty() || after_name.starts_with([' ', '\t', '>', '/'])) {
        return false;
    }
    let mut quote: Option<char> = None;
    for (index, ch) in after_name.char_indices() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '>' => return after_name[index + 1..].trim().is_empty(),
            None => {}
        }
    }
    false
}

fn contains_any(line: &str, needles: &[&str]) -> bool {
    let lower = line.to_ascii_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}

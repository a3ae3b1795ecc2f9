//! Code highlighting with syntect.
//!
//! Output is class based (`hl-` prefixed scope classes) so the site's
//! stylesheet owns the colors. Grammars come from two-face's extended set,
//! which adds TypeScript, TSX and others missing from syntect's defaults.

use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::hst::{Element, HstNode};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(two_face::syntax::extra_newlines);

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Class added to `code` elements that were highlighted.
pub const HIGHLIGHTED_CLASS: &str = "highlighted";

/// Highlights every `pre > code.language-*` with a known language.
pub fn highlight_code(node: &mut HstNode) {
    match node {
        HstNode::Element(element) if element.tag == "pre" => {
            for child in element.children.iter_mut() {
                if let HstNode::Element(code) = child
                    && code.tag == "code"
                {
                    highlight_element(code);
                }
            }
        }
        _ => {
            if let Some(children) = node.children_mut() {
                children.iter_mut().for_each(highlight_code);
            }
        }
    }
}

/// Language named by a `language-*` class.
pub fn code_language(code: &Element) -> Option<&str> {
    code.attributes
        .get("class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    SYNTAX_SET
        .find_syntax_by_token(lang)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(lang))
}

fn highlight_element(code: &mut Element) {
    if code.has_class(HIGHLIGHTED_CLASS) {
        return;
    }
    let Some(lang) = code_language(code) else {
        return;
    };
    let Some(syntax) = find_syntax(lang) else {
        log::trace!("highlight: no syntax for `{}`", lang);
        return;
    };

    let source = code.text_content();
    match highlight_source(&source, syntax) {
        Ok(html) => {
            code.children = vec![HstNode::Raw(html)];
            code.add_class(HIGHLIGHTED_CLASS);
        }
        Err(err) => log::warn!("highlight: failed for `{}`: {}", lang, err),
    }
}

fn highlight_source(source: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, CLASS_STYLE);
    for line in LinesWithEndings::from(source) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

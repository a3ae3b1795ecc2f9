//! GitHub-style alert blockquotes (`> [!NOTE]`).

use std::fmt;
use std::str::FromStr;

use crate::mst::MstNode;

/// The five recognized alert keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    /// `[!NOTE]`
    Note,
    /// `[!TIP]`
    Tip,
    /// `[!IMPORTANT]`
    Important,
    /// `[!WARNING]`
    Warning,
    /// `[!CAUTION]`
    Caution,
}

impl AlertKind {
    /// Upper-case keyword, as used in `data-alert`.
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Note => "NOTE",
            AlertKind::Tip => "TIP",
            AlertKind::Important => "IMPORTANT",
            AlertKind::Warning => "WARNING",
            AlertKind::Caution => "CAUTION",
        }
    }

    /// Title shown at the top of the rendered alert.
    pub fn title(self) -> &'static str {
        match self {
            AlertKind::Note => "Note",
            AlertKind::Tip => "Tip",
            AlertKind::Important => "Important",
            AlertKind::Warning => "Warning",
            AlertKind::Caution => "Caution",
        }
    }

    /// Lower-case keyword, used in class names.
    pub fn class_suffix(self) -> &'static str {
        match self {
            AlertKind::Note => "note",
            AlertKind::Tip => "tip",
            AlertKind::Important => "important",
            AlertKind::Warning => "warning",
            AlertKind::Caution => "caution",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown alert keyword.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alert keyword: {0}")]
pub struct UnknownAlertKind(pub String);

impl FromStr for AlertKind {
    type Err = UnknownAlertKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NOTE" => Ok(AlertKind::Note),
            "TIP" => Ok(AlertKind::Tip),
            "IMPORTANT" => Ok(AlertKind::Important),
            "WARNING" => Ok(AlertKind::Warning),
            "CAUTION" => Ok(AlertKind::Caution),
            _ => Err(UnknownAlertKind(s.to_string())),
        }
    }
}

/// Parses a `[!KEYWORD]` line; surrounding whitespace is ignored.
pub fn parse_alert_marker(line: &str) -> Option<AlertKind> {
    let inner = line.trim().strip_prefix("[!")?.strip_suffix(']')?;
    inner.parse().ok()
}

/// Rewrites every alert blockquote in the tree into [`MstNode::Alert`].
///
/// A blockquote is an alert when its first paragraph starts with a text
/// line that is exactly `[!KEYWORD]`. That line is removed; the paragraph
/// is dropped if nothing else remains in it.
pub fn recognize_alerts(node: &mut MstNode) {
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            recognize_alerts(child);
        }
    }

    let MstNode::Blockquote(children) = node else {
        return;
    };
    let Some(kind) = strip_alert_marker(children) else {
        return;
    };
    let children = std::mem::take(children);
    *node = MstNode::Alert { kind, children };
}

fn strip_alert_marker(children: &mut Vec<MstNode>) -> Option<AlertKind> {
    let Some(MstNode::Paragraph(inline)) = children.first_mut() else {
        return None;
    };
    let Some(MstNode::Text(text)) = inline.first_mut() else {
        return None;
    };

    let (first_line, rest) = match text.split_once('\n') {
        Some((line, rest)) => (line, Some(rest)),
        None => (text.as_str(), None),
    };
    let kind = parse_alert_marker(first_line)?;

    match rest {
        Some(rest) => *text = rest.to_string(),
        None => {
            inline.remove(0);
            // A hard break right after the marker belongs to the marker line.
            if matches!(inline.first(), Some(MstNode::Break)) {
                inline.remove(0);
            }
        }
    }
    if let Some(MstNode::Text(text)) = inline.first_mut() {
        let trimmed = text.trim_start().len();
        if trimmed == 0 {
            inline.remove(0);
        } else if trimmed != text.len() {
            *text = text.trim_start().to_string();
        }
    }
    if inline.is_empty() {
        children.remove(0);
    }
    Some(kind)
}

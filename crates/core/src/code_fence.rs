//! Fenced code block tracking for line-oriented pre-passes.
//!
//! Directive markers are only recognized outside fenced code, so the
//! directive pre-pass feeds every line through a [`FenceTracker`] first.

/// An open code fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence {
    /// Fence marker character (`` ` `` or `~`).
    pub marker: char,
    /// Number of marker characters in the opening fence.
    pub length: usize,
    /// 1-indexed line of the opening fence.
    pub line: usize,
}

/// How a single line relates to fenced code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Ordinary Markdown outside any fence.
    Markdown,
    /// Opening fence line.
    FenceOpen,
    /// Line inside a fence.
    FenceBody,
    /// Closing fence line.
    FenceClose,
}

impl LineKind {
    /// Whether the line belongs to a code block and must be left untouched.
    pub fn is_code(self) -> bool {
        !matches!(self, LineKind::Markdown)
    }
}

/// Tracks fenced code blocks across lines using CommonMark rules.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    open: Option<OpenFence>,
    line: usize,
}

impl FenceTracker {
    /// Creates a tracker positioned before the first line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently open fence, if any.
    pub fn open_fence(&self) -> Option<OpenFence> {
        self.open
    }

    /// Classifies the next line and advances the tracker.
    pub fn observe(&mut self, line: &str) -> LineKind {
        self.line += 1;
        let (columns, offset) = leading_indent(line);
        // 4+ columns is an indented code block (or fence content), never a fence line.
        let fence = if columns <= 3 {
            fence_run(&line[offset..])
        } else {
            None
        };

        match (self.open, fence) {
            (None, Some((marker, length, info))) => {
                // Backtick fences cannot carry backticks in their info string.
                if marker == '`' && info.contains('`') {
                    return LineKind::Markdown;
                }
                self.open = Some(OpenFence {
                    marker,
                    length,
                    line: self.line,
                });
                LineKind::FenceOpen
            }
            (None, None) => LineKind::Markdown,
            (Some(open), Some((marker, length, info)))
                if marker == open.marker && length >= open.length && info.trim().is_empty() =>
            {
                self.open = None;
                LineKind::FenceClose
            }
            (Some(_), _) => LineKind::FenceBody,
        }
    }
}

/// Returns (visual columns, byte offset) of leading whitespace; tabs advance
/// to the next multiple of four.
pub(crate) fn leading_indent(line: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - (columns % 4),
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

/// Splits a run of 3+ fence markers from the rest of the line.
fn fence_run(text: &str) -> Option<(char, usize, &str)> {
    let marker = text.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = text.chars().take_while(|c| *c == marker).count();
    (length >= 3).then(|| (marker, length, &text[length..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<LineKind> {
        let mut tracker = FenceTracker::new();
        input.lines().map(|line| tracker.observe(line)).collect()
    }

    #[test]
    fn backtick_fence_round_trip() {
        assert_eq!(
            kinds("```js\nconsole.log(1)\n```\nafter"),
            vec![
                LineKind::FenceOpen,
                LineKind::FenceBody,
                LineKind::FenceClose,
                LineKind::Markdown
            ]
        );
    }

    #[test]
    fn four_space_indent_is_not_a_fence() {
        assert_eq!(kinds("    ```js"), vec![LineKind::Markdown]);
        assert_eq!(kinds("\t```js"), vec![LineKind::Markdown]);
    }

    #[test]
    fn three_space_indent_opens_fence() {
        assert_eq!(kinds("   ~~~"), vec![LineKind::FenceOpen]);
    }

    #[test]
    fn mismatched_marker_does_not_close() {
        let mut tracker = FenceTracker::new();
        tracker.observe("~~~ts");
        assert_eq!(tracker.observe("```"), LineKind::FenceBody);
        assert_eq!(tracker.open_fence().map(|f| f.marker), Some('~'));
    }

    #[test]
    fn shorter_closer_stays_inside() {
        let lines = kinds("````markdown\n```js\n:::center\n```\n````");
        assert_eq!(
            lines,
            vec![
                LineKind::FenceOpen,
                LineKind::FenceBody,
                LineKind::FenceBody,
                LineKind::FenceBody,
                LineKind::FenceClose
            ]
        );
    }

    #[test]
    fn closer_with_info_string_is_content() {
        let mut tracker = FenceTracker::new();
        tracker.observe("```");
        assert_eq!(tracker.observe("```js"), LineKind::FenceBody);
        assert_eq!(tracker.observe("```  "), LineKind::FenceClose);
    }

    #[test]
    fn inline_backticks_are_not_fences() {
        assert_eq!(kinds("``not a fence``"), vec![LineKind::Markdown]);
        assert_eq!(kinds("```a`b"), vec![LineKind::Markdown]);
    }

    #[test]
    fn tracks_opening_line() {
        let mut tracker = FenceTracker::new();
        tracker.observe("text");
        tracker.observe("```");
        assert_eq!(tracker.open_fence().map(|f| f.line), Some(2));
        assert!(LineKind::FenceBody.is_code());
        assert!(!LineKind::Markdown.is_code());
    }
}

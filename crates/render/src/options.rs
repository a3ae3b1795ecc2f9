//! Render configuration.

use serde::{Deserialize, Serialize};

/// Which output a render is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Blog page and editor preview.
    Full,
    /// RSS feed items.
    Feed,
}

/// Stage selection for a render.
///
/// Directives and GFM are always on; everything else can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Recognize `> [!NOTE]` alert blockquotes.
    pub alerts: bool,
    /// Parse `$…$` / `$$…$$` and render it with KaTeX.
    pub math: bool,
    /// Syntax-highlight fenced code with a known language.
    pub highlight: bool,
    /// Give headings raw-text ids and an anchor-link child.
    pub heading_anchors: bool,
    /// Turn footnote links into `data-scroll-target` hooks.
    pub footnote_rewrite: bool,
    /// Pass raw HTML through; when false it is escaped.
    pub allow_raw_html: bool,
}

impl RenderOptions {
    /// Every stage enabled.
    pub const fn full() -> Self {
        Self {
            alerts: true,
            math: true,
            highlight: true,
            heading_anchors: true,
            footnote_rewrite: true,
            allow_raw_html: true,
        }
    }

    /// Parse, directives, convert, serialize.
    pub const fn feed() -> Self {
        Self {
            alerts: false,
            math: false,
            highlight: false,
            heading_anchors: false,
            footnote_rewrite: false,
            allow_raw_html: true,
        }
    }

    /// Preset for a mode.
    pub const fn for_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Full => Self::full(),
            RenderMode::Feed => Self::feed(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::full()
    }
}

impl From<RenderMode> for RenderOptions {
    fn from(mode: RenderMode) -> Self {
        Self::for_mode(mode)
    }
}

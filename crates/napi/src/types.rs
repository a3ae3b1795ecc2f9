//! NAPI-exposed data structures.

use mdpress_core::ParseWarning;
use mdpress_render::{RenderMode, RenderOptions};
use napi_derive::napi;

/// Render preset names.
#[napi(string_enum)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderModeInput {
    /// Blog page and editor preview.
    #[napi(value = "full")]
    Full,
    /// RSS feed.
    #[napi(value = "feed")]
    Feed,
}

impl From<RenderModeInput> for RenderMode {
    fn from(mode: RenderModeInput) -> Self {
        match mode {
            RenderModeInput::Full => RenderMode::Full,
            RenderModeInput::Feed => RenderMode::Feed,
        }
    }
}

/// Options for `renderWithOptions`. Unset fields come from the preset.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Preset to start from; defaults to `full`.
    pub mode: Option<RenderModeInput>,
    /// Recognize `> [!NOTE]` alerts.
    pub alerts: Option<bool>,
    /// Parse and render math.
    pub math: Option<bool>,
    /// Highlight fenced code.
    pub highlight: Option<bool>,
    /// Add heading ids and anchor links.
    pub heading_anchors: Option<bool>,
    /// Rewrite footnote links into scroll targets.
    pub footnote_rewrite: Option<bool>,
    /// Pass raw HTML through (escape it when false).
    pub allow_raw_html: Option<bool>,
}

impl RenderConfig {
    /// Resolves the config onto its preset.
    pub fn to_options(&self) -> RenderOptions {
        let base = RenderOptions::for_mode(self.mode.map(Into::into).unwrap_or(RenderMode::Full));
        RenderOptions {
            alerts: self.alerts.unwrap_or(base.alerts),
            math: self.math.unwrap_or(base.math),
            highlight: self.highlight.unwrap_or(base.highlight),
            heading_anchors: self.heading_anchors.unwrap_or(base.heading_anchors),
            footnote_rewrite: self.footnote_rewrite.unwrap_or(base.footnote_rewrite),
            allow_raw_html: self.allow_raw_html.unwrap_or(base.allow_raw_html),
        }
    }
}

/// Parse warning returned from Rust
#[napi(object)]
#[derive(Debug, Clone)]
pub struct ParseWarningEntry {
    /// Warning type (e.g., "unclosed_directive")
    pub warning_type: String,
    /// Line number where warning occurred
    pub line: u32,
    /// Human-readable message
    pub message: String,
}

impl From<&ParseWarning> for ParseWarningEntry {
    fn from(warning: &ParseWarning) -> Self {
        let warning_type = match warning {
            ParseWarning::UnclosedDirective { .. } => "unclosed_directive",
            ParseWarning::StrayDirectiveCloser { .. } => "stray_directive_closer",
            ParseWarning::UnclosedCodeFence { .. } => "unclosed_code_fence",
        };
        Self {
            warning_type: warning_type.to_string(),
            line: warning.location().line as u32,
            message: warning.to_string(),
        }
    }
}

/// Non-fatal findings for a document.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct Diagnostics {
    /// Non-fatal warnings
    pub warnings: Vec<ParseWarningEntry>,
}

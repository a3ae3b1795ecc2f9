#![deny(missing_docs)]
//! mdpress core: Markdown parsing into a typed syntax tree.
//!
//! Parsing goes through markdown-rs; container directives and alerts are
//! layered on top and surface as their own [`MstNode`] variants.

/// Alert blockquote recognition.
pub mod alert;
/// Code fence detection utilities.
pub mod code_fence;
/// Container directive syntax.
pub mod directives;
/// Core error and diagnostic types.
pub mod error;
/// Raw HTML block detection.
pub mod html_block;
/// Markdown syntax tree.
pub mod mst;
/// Markdown parsing utilities and extension hooks.
pub mod parse;

pub use alert::{AlertKind, parse_alert_marker, recognize_alerts};
pub use code_fence::{FenceTracker, LineKind, OpenFence};
pub use directives::{
    DirectiveOpening, MarkedSource, Marker, directive_closer_len, mark_directives,
    parse_opening_directive,
};
pub use error::{MarkdownError, ParseDiagnostics, ParseWarning, SourceLocation};
pub use html_block::HtmlBlockTracker;
pub use mst::{Align, Directive, MstNode, Wrapper, regroup_directives};
pub use parse::{MstTransform, ParseOptions, ParserPipeline, parse, parse_mdast_with_options};

#![deny(missing_docs)]
//! mdpress rendering: Markdown to HTML for blog pages, previews and feeds.
//!
//! ```text
//! parse -> directives -> alerts -> convert -> math -> highlight -> anchors -> footnotes -> serialize
//! ```
//!
//! Feed renders skip alerts and every post-conversion pass.

/// Heading anchor injection.
pub mod anchors;
/// Parallel feed rendering.
pub mod batch;
/// MST to HST conversion.
pub mod convert;
/// Directive wrapper assignment.
pub mod directive;
/// Public render error.
pub mod error;
/// Footnote link rewriting.
pub mod footnotes;
/// Code highlighting.
pub mod highlight;
/// HTML syntax tree.
pub mod hst;
/// Math rendering.
pub mod math;
/// Render configuration.
pub mod options;
/// Stage lists and entry points.
pub mod pipeline;
/// Client-side scroll script and shared constants.
pub mod script;
/// HTML serialization.
pub mod serialize;

pub use batch::{
    BatchOptions, BatchOutcome, BatchStats, FeedEntry, FeedResult, render_batch, render_feed_batch,
};
pub use convert::{ConvertOptions, to_html_tree};
pub use error::RenderError;
pub use hst::{Attributes, Element, HstNode};
pub use options::{RenderMode, RenderOptions};
pub use pipeline::{Pipeline, render, render_for_feed, render_full};
pub use script::{FOOTNOTE_ID_PREFIX, SCROLL_OFFSET_PX, SCROLL_SCRIPT};
pub use serialize::serialize;

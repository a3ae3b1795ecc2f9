#![deny(missing_docs)]
//! Node.js bindings that surface mdpress's Rust implementation.

use mdpress_core::mark_directives;
use mdpress_render::{RenderOptions, render};
use napi::bindgen_prelude::*;
use napi_derive::napi;

/// Batch feed rendering types.
pub mod batch;
/// NAPI-exposed data structures.
pub mod types;
pub use batch::*;
pub use types::*;

/// Renders one document on the libuv thread pool.
pub struct RenderTask {
    markdown: String,
    options: RenderOptions,
}

impl RenderTask {
    fn new(markdown: String, options: RenderOptions) -> Self {
        Self { markdown, options }
    }
}

impl Task for RenderTask {
    type Output = String;
    type JsValue = String;

    fn compute(&mut self) -> napi::Result<Self::Output> {
        render(&self.markdown, &self.options).map_err(|err| Error::from_reason(err.to_string()))
    }

    fn resolve(&mut self, _env: Env, output: Self::Output) -> napi::Result<Self::JsValue> {
        Ok(output)
    }
}

/// Renders Markdown for a blog page or the editor preview.
///
/// Rejects with "failed to parse markdown content" when rendering fails.
#[napi]
pub fn render_full(markdown: String) -> AsyncTask<RenderTask> {
    AsyncTask::new(RenderTask::new(markdown, RenderOptions::full()))
}

/// Renders Markdown for the RSS feed: no anchors, math, highlighting or
/// footnote rewriting.
#[napi]
pub fn render_for_feed(markdown: String) -> AsyncTask<RenderTask> {
    AsyncTask::new(RenderTask::new(markdown, RenderOptions::feed()))
}

/// Renders Markdown with an explicit stage selection.
#[napi]
pub fn render_with_options(markdown: String, config: Option<RenderConfig>) -> AsyncTask<RenderTask> {
    let options = config.unwrap_or_default().to_options();
    AsyncTask::new(RenderTask::new(markdown, options))
}

/// Renders many feed items in parallel. Each entry succeeds or fails on its own.
#[napi]
pub fn render_feed_batch(
    entries: Vec<FeedEntryInput>,
    options: Option<BatchOptions>,
) -> FeedBatchOutcome {
    let options = options.unwrap_or_default();
    let entries = entries.into_iter().map(Into::into).collect();
    mdpress_render::render_feed_batch(entries, &(&options).into()).into()
}

/// Reports unclosed or stray directive fences and unclosed code fences.
#[napi]
pub fn check_markdown(markdown: String) -> Diagnostics {
    let marked = mark_directives(&markdown);
    Diagnostics {
        warnings: marked
            .diagnostics
            .warnings
            .iter()
            .map(ParseWarningEntry::from)
            .collect(),
    }
}

/// Client-side listener that activates `data-scroll-target` links.
#[napi]
pub fn scroll_script() -> String {
    mdpress_render::SCROLL_SCRIPT.to_string()
}

/// Pixel offset used by the scroll script.
#[napi]
pub fn scroll_offset() -> u32 {
    mdpress_render::SCROLL_OFFSET_PX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_overrides_preset() {
        let config = RenderConfig {
            mode: Some(RenderModeInput::Feed),
            math: Some(true),
            ..RenderConfig::default()
        };
        let options = config.to_options();
        assert!(options.math);
        assert!(!options.heading_anchors);
        assert_eq!(RenderConfig::default().to_options(), RenderOptions::full());
    }

    #[test]
    fn render_task_computes_html() {
        let mut task = RenderTask::new(":::center\nHi\n:::".to_string(), RenderOptions::feed());
        assert_eq!(
            task.compute().unwrap(),
            r#"<div class="text-center"><p>Hi</p></div>"#
        );
    }

    #[test]
    fn batch_keeps_order() {
        let outcome = render_feed_batch(
            vec![
                FeedEntryInput {
                    id: "a".to_string(),
                    markdown: "# A".to_string(),
                },
                FeedEntryInput {
                    id: "b".to_string(),
                    markdown: "*b*".to_string(),
                },
            ],
            Some(BatchOptions {
                max_threads: Some(1),
            }),
        );
        assert_eq!(outcome.stats.total, 2);
        assert_eq!(outcome.results[0].html.as_deref(), Some("<h1>A</h1>"));
        assert_eq!(outcome.results[1].html.as_deref(), Some("<p><em>b</em></p>"));
    }

    #[test]
    fn diagnostics_report_unclosed_directive() {
        let diagnostics = check_markdown(":::center\nHi".to_string());
        assert_eq!(diagnostics.warnings.len(), 1);
        assert_eq!(diagnostics.warnings[0].warning_type, "unclosed_directive");
        assert_eq!(diagnostics.warnings[0].line, 1);
    }

    #[test]
    fn script_is_exposed() {
        assert!(scroll_script().contains("data-scroll-target"));
        assert_eq!(scroll_offset(), 80);
    }
}

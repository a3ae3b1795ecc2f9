//! Render pipeline: an explicit, ordered stage list per configuration.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use mdpress_core::{MarkdownError, MstNode, ParseOptions, parse, recognize_alerts};

use crate::anchors::inject_anchors;
use crate::convert::{ConvertOptions, to_html_tree};
use crate::directive::apply_directive_wrappers;
use crate::error::RenderError;
use crate::footnotes::rewrite_footnotes;
use crate::highlight::highlight_code;
use crate::hst::HstNode;
use crate::math::render_math;
use crate::options::RenderOptions;
use crate::serialize::serialize;

/// A pass over the Markdown tree.
pub type MstStage = fn(&mut MstNode);
/// A pass over the HTML tree.
pub type HstStage = fn(&mut HstNode);

/// Ordered stages for one render configuration.
#[derive(Clone)]
pub struct Pipeline {
    parse: ParseOptions,
    convert: ConvertOptions,
    mst_stages: Vec<(&'static str, MstStage)>,
    hst_stages: Vec<(&'static str, HstStage)>,
}

impl Pipeline {
    /// Builds the stage list for `options`.
    pub fn new(options: &RenderOptions) -> Self {
        let parse = ParseOptions {
            math: options.math,
            // Alerts run as an explicit stage below.
            alerts: false,
            ..ParseOptions::feed()
        };

        let mut mst_stages: Vec<(&'static str, MstStage)> = Vec::new();
        mst_stages.push(("directives", apply_directive_wrappers));
        if options.alerts {
            mst_stages.push(("alerts", recognize_alerts));
        }

        let mut hst_stages: Vec<(&'static str, HstStage)> = Vec::new();
        if options.math {
            hst_stages.push(("math", render_math));
        }
        if options.highlight {
            hst_stages.push(("highlight", highlight_code));
        }
        if options.heading_anchors {
            hst_stages.push(("anchors", inject_anchors));
        }
        if options.footnote_rewrite {
            hst_stages.push(("footnotes", rewrite_footnotes));
        }

        Self {
            parse,
            convert: ConvertOptions {
                allow_raw_html: options.allow_raw_html,
            },
            mst_stages,
            hst_stages,
        }
    }

    /// Blog page pipeline.
    pub fn full() -> Self {
        Self::new(&RenderOptions::full())
    }

    /// Feed pipeline.
    pub fn feed() -> Self {
        Self::new(&RenderOptions::feed())
    }

    /// Appends a pass over the Markdown tree, run after the built-in ones.
    pub fn push_mst_stage(&mut self, name: &'static str, stage: MstStage) {
        self.mst_stages.push((name, stage));
    }

    /// Appends a pass over the HTML tree, run after the built-in ones.
    pub fn push_hst_stage(&mut self, name: &'static str, stage: HstStage) {
        self.hst_stages.push((name, stage));
    }

    /// Stage names in execution order, including parse, convert and serialize.
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = vec!["parse"];
        names.extend(self.mst_stages.iter().map(|(name, _)| *name));
        names.push("convert");
        names.extend(self.hst_stages.iter().map(|(name, _)| *name));
        names.push("serialize");
        names
    }

    /// Renders Markdown to HTML.
    ///
    /// Errors and panics inside any stage are logged and reported as
    /// [`RenderError::Failed`].
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        match catch_unwind(AssertUnwindSafe(|| self.run(markdown))) {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(err)) => {
                log::error!("markdown render failed: {}", err);
                Err(RenderError::Failed)
            }
            Err(payload) => {
                log::error!("markdown render panicked: {}", panic_message(&*payload));
                Err(RenderError::Failed)
            }
        }
    }

    /// Runs every stage, surfacing the detailed error.
    pub fn run(&self, markdown: &str) -> Result<String, MarkdownError> {
        log::trace!("stage parse ({} bytes)", markdown.len());
        let mut mst = parse(markdown, &self.parse)?;
        for (name, stage) in &self.mst_stages {
            log::trace!("stage {}", name);
            stage(&mut mst);
        }

        log::trace!("stage convert");
        let mut hst = to_html_tree(&mst, &self.convert);
        for (name, stage) in &self.hst_stages {
            log::trace!("stage {}", name);
            stage(&mut hst);
        }

        log::trace!("stage serialize");
        Ok(serialize(&hst))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Renders with a custom stage selection.
pub fn render(markdown: &str, options: &RenderOptions) -> Result<String, RenderError> {
    Pipeline::new(options).render(markdown)
}

/// Renders for the blog page and editor preview.
pub fn render_full(markdown: &str) -> Result<String, RenderError> {
    Pipeline::full().render(markdown)
}

/// Renders for the RSS feed.
pub fn render_for_feed(markdown: &str) -> Result<String, RenderError> {
    Pipeline::feed().render(markdown)
}

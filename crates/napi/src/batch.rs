//! Batch feed rendering types.

use mdpress_render::batch as render_batch;
use napi_derive::napi;

/// One feed item to render.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct FeedEntryInput {
    /// Caller identifier (typically the post slug).
    pub id: String,
    /// Markdown source.
    pub markdown: String,
}

/// Result for a single entry in a batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct FeedBatchResult {
    /// Identifier matching the input.
    pub id: String,
    /// Rendered HTML (present on success).
    pub html: Option<String>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchStats {
    /// Total number of entries processed.
    pub total: u32,
    /// Number of successfully rendered entries.
    pub succeeded: u32,
    /// Number of failed entries.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<u32>,
}

/// Result of batch processing containing all results and statistics.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct FeedBatchOutcome {
    /// Individual results in input order.
    pub results: Vec<FeedBatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

impl From<FeedEntryInput> for render_batch::FeedEntry {
    fn from(input: FeedEntryInput) -> Self {
        render_batch::FeedEntry::new(input.id, input.markdown)
    }
}

impl From<&BatchOptions> for render_batch::BatchOptions {
    fn from(options: &BatchOptions) -> Self {
        render_batch::BatchOptions {
            max_threads: options.max_threads.map(|threads| threads.max(1) as usize),
        }
    }
}

impl From<render_batch::BatchOutcome> for FeedBatchOutcome {
    fn from(outcome: render_batch::BatchOutcome) -> Self {
        FeedBatchOutcome {
            results: outcome
                .results
                .into_iter()
                .map(|result| FeedBatchResult {
                    id: result.id,
                    html: result.html,
                    error: result.error,
                })
                .collect(),
            stats: BatchStats {
                total: outcome.stats.total,
                succeeded: outcome.stats.succeeded,
                failed: outcome.stats.failed,
                processing_time_ms: outcome.stats.processing_time_ms,
            },
        }
    }
}

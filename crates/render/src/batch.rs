//! Parallel feed rendering with per-item failure isolation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;

/// One feed item to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Caller identifier (typically the post slug).
    pub id: String,
    /// Markdown source.
    pub markdown: String,
}

impl FeedEntry {
    /// Creates an entry.
    pub fn new(id: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            markdown: markdown.into(),
        }
    }
}

/// Options for batch rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOptions {
    /// Maximum worker threads. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
}

/// Result for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedResult {
    /// Identifier matching the input.
    pub id: String,
    /// Rendered HTML (present on success).
    pub html: Option<String>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Batch statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Number of entries.
    pub total: u32,
    /// Entries rendered successfully.
    pub succeeded: u32,
    /// Entries that failed.
    pub failed: u32,
    /// Wall time in milliseconds.
    pub processing_time_ms: f64,
}

/// Results in input order plus statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// One result per input entry.
    pub results: Vec<FeedResult>,
    /// Statistics.
    pub stats: BatchStats,
}

/// Renders feed entries in parallel. A failing entry never affects the others.
pub fn render_feed_batch(entries: Vec<FeedEntry>, options: &BatchOptions) -> BatchOutcome {
    render_batch(&Pipeline::feed(), entries, options)
}

/// Renders entries in parallel through `pipeline`.
pub fn render_batch(
    pipeline: &Pipeline,
    entries: Vec<FeedEntry>,
    options: &BatchOptions,
) -> BatchOutcome {
    let start = Instant::now();

    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("batch: falling back to global pool: {}", err))
            .ok()
    });

    let total = entries.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_entry = |entry: FeedEntry| -> FeedResult {
        match pipeline.render(&entry.markdown) {
            Ok(html) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                FeedResult {
                    id: entry.id,
                    html: Some(html),
                    error: None,
                }
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                FeedResult {
                    id: entry.id,
                    html: None,
                    error: Some(err.to_string()),
                }
            }
        }
    };

    let results: Vec<FeedResult> = match pool {
        Some(pool) => pool.install(|| entries.into_par_iter().map(process_entry).collect()),
        None => entries.into_par_iter().map(process_entry).collect(),
    };

    let stats = BatchStats {
        total,
        succeeded: succeeded.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    log::debug!(
        "batch: rendered {}/{} feed entries in {:.1}ms",
        stats.succeeded,
        stats.total,
        stats.processing_time_ms
    );

    BatchOutcome { results, stats }
}

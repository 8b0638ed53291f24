//! Progress reporting for a batch run.
//!
//! Two renditions share one surface:
//! - [`InteractiveReporter`]: a redrawn spinner line with a glyph bar, used for
//!   small runs that fit into a single chunk
//! - [`PlainReporter`]: line-per-event output that stays readable in logs
//!
//! Both derive a completeness fraction from [`ProgressState`] so the decode
//! and encode phases of a chunk read as one bar.

mod interactive;
mod plain;
mod render;

pub use interactive::InteractiveReporter;
pub use plain::PlainReporter;
pub use render::{glyph_bar, percent_of, pretty_size, render_results};

use crate::core::{FileResultRecord, ProgressState};

/// Runs with fewer files than this (and fewer than the concurrency) get the
/// interactive reporter.
pub const INTERACTIVE_FILE_LIMIT: usize = 16;

/// Which reporter a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterKind {
    Interactive,
    Plain,
}

impl ReporterKind {
    /// Interactive only when every file fits into one chunk and the run is
    /// small enough to show per-file results.
    pub fn select(file_count: usize, concurrency: usize) -> Self {
        if file_count < INTERACTIVE_FILE_LIMIT && file_count < concurrency {
            Self::Interactive
        } else {
            Self::Plain
        }
    }
}

/// Receives status changes, progress counts and final results from the
/// pipeline.
///
/// Implementations use interior mutability: the coordinator reports from
/// many concurrently polled futures through a shared reference.
pub trait ProgressReporter: Send + Sync {
    fn set_status(&self, text: &str);

    /// Reports `done` of `total` units of the current phase. `file` names
    /// the file that just completed a unit.
    fn set_progress(&self, done: usize, total: usize, file: Option<&str>);

    /// Ends the chunk's rendition with a summary and the chunk's results.
    fn finish(&self, summary: &str, results: &[FileResultRecord]);

    fn offsets(&self) -> ProgressState;

    fn set_offsets(&self, offsets: ProgressState);

    /// Called once before the first chunk.
    fn begin_batch(&self, _concurrency: usize, _chunk_count: usize) {}

    /// Called before each chunk with 1-based chunk and image positions.
    fn begin_chunk(&self, _index: usize, _chunk_count: usize, _first: usize, _last: usize) {}

    fn end_chunk(&self) {}
}

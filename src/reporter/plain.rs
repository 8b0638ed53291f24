use std::io::{self, Stdout, Write};
use console::style;
use parking_lot::Mutex;
use crate::core::{FileResultRecord, ProgressState};
use super::ProgressReporter;

/// One line per event, no redraws.
pub struct PlainReporter<W: Write + Send = Stdout> {
    out: Mutex<W>,
    offsets: Mutex<ProgressState>,
}

impl PlainReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> PlainReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            offsets: Mutex::new(ProgressState::default()),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn line(&self, text: impl std::fmt::Display) {
        let mut out = self.out.lock();
        // Console output is best effort.
        let _ = writeln!(out, "{text}");
    }
}

impl PlainReporter<Vec<u8>> {
    /// Everything written so far.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.out.lock()).into_owned()
    }
}

impl<W: Write + Send> ProgressReporter for PlainReporter<W> {
    fn set_status(&self, text: &str) {
        self.line(format_args!("{} {text}", style("Status:").bold()));
    }

    fn set_progress(&self, done: usize, total: usize, file: Option<&str>) {
        match file {
            Some(file) => self.line(format_args!("Progress: {done}/{total} ({file})")),
            None => self.line("Working..."),
        }
    }

    fn finish(&self, _summary: &str, _results: &[FileResultRecord]) {
        self.line("Processing complete.");
    }

    fn offsets(&self) -> ProgressState {
        *self.offsets.lock()
    }

    fn set_offsets(&self, offsets: ProgressState) {
        *self.offsets.lock() = offsets;
    }

    fn begin_batch(&self, concurrency: usize, _chunk_count: usize) {
        self.line(style(format!("Will process at most {concurrency} files at a time")).bold());
    }

    fn begin_chunk(&self, index: usize, chunk_count: usize, first: usize, last: usize) {
        self.line(format_args!(
            "Processing batch {index} of {chunk_count} (images {first} through {last})"
        ));
    }

    fn end_chunk(&self) {
        self.line("");
        let _ = self.out.lock().flush();
    }
}

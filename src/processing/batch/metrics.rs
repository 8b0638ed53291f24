use serde::Serialize;
use std::fmt;
use tracing::debug;
use crate::core::FileResultRecord;
use crate::reporter::pretty_size;

/// Totals for one processed chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub files: usize,
    pub skipped: usize,
    pub outputs: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl ChunkReport {
    pub fn from_records(files: usize, skipped: usize, records: &[FileResultRecord]) -> Self {
        Self {
            files,
            skipped,
            outputs: records.iter().map(|r| r.outputs.len()).sum(),
            input_bytes: records.iter().map(|r| r.size).sum(),
            output_bytes: records
                .iter()
                .flat_map(|r| r.outputs.iter().map(|o| o.size))
                .sum(),
        }
    }
}

/// Run-wide totals accumulated chunk by chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchMetrics {
    pub chunks: usize,
    pub files: usize,
    pub skipped: usize,
    pub outputs: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl BatchMetrics {
    pub fn record_chunk(&mut self, report: &ChunkReport) {
        self.chunks += 1;
        self.files += report.files;
        self.skipped += report.skipped;
        self.outputs += report.outputs;
        self.input_bytes += report.input_bytes;
        self.output_bytes += report.output_bytes;

        debug!(
            "Chunk {} recorded - {} files, {} outputs, {} skipped",
            self.chunks, report.files, report.outputs, report.skipped
        );
    }
}

impl fmt::Display for BatchMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} files into {} outputs in {} batch{} ({} read, {} written)",
            self.files - self.skipped,
            self.outputs,
            self.chunks,
            if self.chunks == 1 { "" } else { "es" },
            pretty_size(self.input_bytes),
            pretty_size(self.output_bytes),
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        Ok(())
    }
}

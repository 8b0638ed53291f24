/// Offsets that fold the decode and encode phases of a chunk into one
/// completeness fraction.
///
/// During decode `total_offset` holds the chunk size and `progress_offset` is
/// zero, so the fraction climbs to one half. Once decoding is done,
/// `progress_offset` is set to the decoded count and the encode phase carries
/// the fraction the rest of the way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub progress_offset: usize,
    pub total_offset: usize,
}

impl ProgressState {
    /// Resets both offsets for a new chunk of `chunk_len` files.
    pub fn begin_chunk(&mut self, chunk_len: usize) {
        self.progress_offset = 0;
        self.total_offset = chunk_len;
    }

    /// `(progress_offset + done) / (total_offset + total)`, clamped to `[0, 1]`.
    /// A zero denominator yields zero.
    pub fn completeness(&self, done: usize, total: usize) -> f64 {
        let denominator = self.total_offset + total;
        if denominator == 0 {
            return 0.0;
        }
        ((self.progress_offset + done) as f64 / denominator as f64).clamp(0.0, 1.0)
    }
}

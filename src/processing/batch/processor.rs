use tracing::{debug, info};
use crate::core::{InputFile, RunConfig};
use crate::processing::pool::WorkerPool;
use crate::reporter::{InteractiveReporter, PlainReporter, ProgressReporter, ReporterKind};
use crate::utils::ConvertResult;
use super::coordinator::PipelineCoordinator;
use super::metrics::BatchMetrics;
use super::results::ResultAggregator;

/// Splits the input list into chunks of at most `concurrency` files and runs
/// them one after another, each on its own worker pool.
pub struct BatchScheduler {
    config: RunConfig,
}

impl BatchScheduler {
    pub fn new(config: RunConfig) -> Self {
        debug!("Creating BatchScheduler with chunk size of {}", config.concurrency);
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Consecutive chunks in input order; only the last may be short.
    pub fn create_chunks<'f>(&self, files: &'f [InputFile]) -> Vec<&'f [InputFile]> {
        files.chunks(self.config.concurrency.max(1)).collect()
    }

    pub fn reporter_kind(&self, file_count: usize) -> ReporterKind {
        ReporterKind::select(file_count, self.config.concurrency)
    }

    /// Runs every chunk with the reporter picked for `files.len()`.
    pub async fn run<P: WorkerPool>(&self, files: &[InputFile]) -> ConvertResult<BatchMetrics> {
        match self.reporter_kind(files.len()) {
            ReporterKind::Interactive => {
                self.run_with::<P>(files, &InteractiveReporter::new()).await
            }
            ReporterKind::Plain => self.run_with::<P>(files, &PlainReporter::stdout()).await,
        }
    }

    /// Runs every chunk, reporting to `reporter`. The first failing chunk
    /// ends the run; later chunks are not started.
    pub async fn run_with<P: WorkerPool>(
        &self,
        files: &[InputFile],
        reporter: &dyn ProgressReporter,
    ) -> ConvertResult<BatchMetrics> {
        let mut metrics = BatchMetrics::default();
        if files.is_empty() {
            info!("No input files to process");
            return Ok(metrics);
        }

        let chunks = self.create_chunks(files);
        info!("Processing batch of {} files in {} chunks", files.len(), chunks.len());

        let results = ResultAggregator::new();
        let coordinator = PipelineCoordinator::new(&self.config, reporter, &results);
        reporter.begin_batch(self.config.concurrency, chunks.len());

        let mut first = 1;
        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let last = first + chunk.len() - 1;
            if chunk_index == 0 || chunk_index == chunks.len() - 1 || chunk_index % 5 == 0 {
                debug!("Processing chunk {}/{}", chunk_index + 1, chunks.len());
            }

            reporter.begin_chunk(chunk_index + 1, chunks.len(), first, last);
            let report = coordinator.process_chunk::<P>(chunk).await?;
            reporter.end_chunk();

            metrics.record_chunk(&report);
            first = last + 1;
        }

        info!("Batch processing completed: {metrics}");
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<InputFile> {
        (0..n).map(|i| InputFile::new(format!("{i}.png"))).collect()
    }

    fn scheduler(concurrency: usize) -> BatchScheduler {
        BatchScheduler::new(RunConfig {
            concurrency,
            ..RunConfig::default()
        })
    }

    #[test]
    fn chunks_cover_inputs_in_order() {
        let inputs = files(10);
        let chunks = scheduler(4).create_chunks(&inputs);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);

        let flattened: Vec<InputFile> = chunks.concat();
        assert_eq!(flattened, inputs);
    }

    #[test]
    fn exact_multiple_has_no_short_chunk() {
        let inputs = files(8);
        assert_eq!(scheduler(4).create_chunks(&inputs).len(), 2);
        assert!(scheduler(4).create_chunks(&[]).is_empty());
    }

    #[test]
    fn reporter_choice_depends_on_count_and_concurrency() {
        assert_eq!(scheduler(8).reporter_kind(3), ReporterKind::Interactive);
        assert_eq!(scheduler(4).reporter_kind(4), ReporterKind::Plain);
        assert_eq!(scheduler(4).reporter_kind(20), ReporterKind::Plain);
        assert_eq!(scheduler(64).reporter_kind(16), ReporterKind::Plain);
        assert_eq!(scheduler(64).reporter_kind(15), ReporterKind::Interactive);
    }
}

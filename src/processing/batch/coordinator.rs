use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use futures::future::{join_all, try_join_all};
use tracing::{debug, warn};
use crate::core::{
    EncodeJob, FailurePolicy, FileResultRecord, ImageId, InputFile, OutputArtifact, ProgressState,
    RunConfig,
};
use crate::processing::pool::WorkerPool;
use crate::reporter::ProgressReporter;
use crate::utils::{extract_filename, output_path, ConvertError, ConvertResult};
use super::metrics::ChunkReport;
use super::results::ResultAggregator;

pub const RESULTS_SUMMARY: &str = "Conversion results:";

/// Drives one chunk through decode, preprocess and encode on a fresh pool.
pub struct PipelineCoordinator<'a> {
    config: &'a RunConfig,
    reporter: &'a dyn ProgressReporter,
    results: &'a ResultAggregator,
}

impl<'a> PipelineCoordinator<'a> {
    pub fn new(
        config: &'a RunConfig,
        reporter: &'a dyn ProgressReporter,
        results: &'a ResultAggregator,
    ) -> Self {
        Self { config, reporter, results }
    }

    /// Processes `files` with a pool of `concurrency` workers.
    ///
    /// The pool is closed whether or not the chunk succeeds. On success the
    /// reporter is finished with the chunk's results and the aggregator is
    /// cleared for the next chunk.
    pub async fn process_chunk<P: WorkerPool>(&self, files: &[InputFile]) -> ConvertResult<ChunkReport> {
        let pool = P::with_workers(self.config.concurrency)?;
        let outcome = self.run_stages(&pool, files).await;
        let closed = pool.close().await;

        let skipped = match outcome.and_then(|skipped| closed.map(|()| skipped)) {
            Ok(skipped) => skipped,
            Err(e) => {
                self.results.clear();
                return Err(e);
            }
        };

        let records = self.results.snapshot();
        self.reporter.finish(RESULTS_SUMMARY, &records);
        self.results.clear();
        Ok(ChunkReport::from_records(files.len(), skipped, &records))
    }

    /// Returns the number of files dropped under [`FailurePolicy::Skip`].
    async fn run_stages<P: WorkerPool>(&self, pool: &P, files: &[InputFile]) -> ConvertResult<usize> {
        let total = files.len();
        self.reporter.set_offsets(ProgressState {
            progress_offset: 0,
            total_offset: total,
        });
        self.reporter.set_status("Decoding");
        self.reporter.set_progress(0, total, None);

        let decoded = AtomicUsize::new(0);
        let decodes = files
            .iter()
            .map(|file| (file.to_string(), self.decode_file(pool, file, &decoded, total)))
            .collect();
        let (ids, decode_skipped) = self.settle("Decoding", decodes).await?;
        let decoded = decoded.into_inner();
        debug!("Decoded {decoded} of {total} files");

        let preprocesses = ids
            .iter()
            .map(|&id| (self.label(id), self.preprocess_image(pool, id)))
            .collect();
        let (ids, preprocess_skipped) = self.settle("Preprocessing", preprocesses).await?;

        let mut offsets = self.reporter.offsets();
        offsets.progress_offset = decoded;
        self.reporter.set_offsets(offsets);
        self.reporter
            .set_status(&format!("Encoding ({} threads)", pool.worker_count()));

        let started = ids.len();
        self.reporter.set_progress(0, started, None);
        let job = self.config.encode_job();
        let finished = AtomicUsize::new(0);
        let encodes = ids
            .iter()
            .map(|&id| (self.label(id), self.encode_image(pool, id, &job, &finished, started)))
            .collect();
        let (_, encode_skipped) = self.settle("Encoding", encodes).await?;

        Ok(decode_skipped + preprocess_skipped + encode_skipped)
    }

    async fn decode_file<P: WorkerPool>(
        &self,
        pool: &P,
        file: &InputFile,
        decoded: &AtomicUsize,
        total: usize,
    ) -> ConvertResult<ImageId> {
        let bytes = tokio::fs::read(file.path())
            .await
            .map_err(|e| ConvertError::IO(format!("Failed to read {file}: {e}")))?;
        let id = pool.ingest(bytes)?;
        let image = pool.decoded(id).await?;
        self.results
            .insert(id, FileResultRecord::new(file.clone(), image.size))?;

        let done = decoded.fetch_add(1, Ordering::SeqCst) + 1;
        self.reporter
            .set_progress(done, total, Some(&extract_filename(file.path())));
        Ok(id)
    }

    async fn preprocess_image<P: WorkerPool>(&self, pool: &P, id: ImageId) -> ConvertResult<ImageId> {
        pool.preprocess(id, &self.config.preprocessors).await?;
        pool.decoded(id).await?;
        Ok(id)
    }

    async fn encode_image<P: WorkerPool>(
        &self,
        pool: &P,
        id: ImageId,
        job: &EncodeJob,
        finished: &AtomicUsize,
        started: usize,
    ) -> ConvertResult<ImageId> {
        let file = self
            .results
            .file_of(id)
            .ok_or_else(|| ConvertError::pool(format!("No result record for image {}", id.0)))?;

        let outputs = pool.encode(id, job).await?;
        for output in outputs {
            let output_file = output_path(
                &self.config.output_dir,
                file.path(),
                &self.config.suffix,
                &output.extension,
            );
            tokio::fs::write(&output_file, &output.binary).await.map_err(|e| {
                ConvertError::IO(format!("Failed to write {}: {e}", output_file.display()))
            })?;
            debug!("Wrote {} ({} bytes)", output_file.display(), output.size());

            self.results.append_output(
                id,
                OutputArtifact {
                    encoder: output.encoder,
                    size: output.size(),
                    extension: output.extension,
                    info_text: output.info_text,
                    output_file,
                },
            )?;
        }

        let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
        self.reporter
            .set_progress(done, started, Some(&extract_filename(file.path())));
        Ok(id)
    }

    fn label(&self, id: ImageId) -> String {
        self.results
            .file_of(id)
            .map(|f| f.to_string())
            .unwrap_or_else(|| format!("image {}", id.0))
    }

    /// Awaits one stage for every file, applying the failure policy.
    async fn settle<T, F>(&self, stage: &str, jobs: Vec<(String, F)>) -> ConvertResult<(Vec<T>, usize)>
    where
        F: Future<Output = ConvertResult<T>>,
    {
        match self.config.failure_policy {
            FailurePolicy::Abort => {
                let jobs = jobs.into_iter().map(|(label, job)| async move {
                    job.await
                        .map_err(|e| ConvertError::processing(format!("{stage} failed for {label}: {e}")))
                });
                Ok((try_join_all(jobs).await?, 0))
            }
            FailurePolicy::Skip => {
                let outcomes = join_all(
                    jobs.into_iter().map(|(label, job)| async move { (label, job.await) }),
                )
                .await;

                let mut settled = Vec::with_capacity(outcomes.len());
                let mut skipped = 0;
                for (label, outcome) in outcomes {
                    match outcome {
                        Ok(value) => settled.push(value),
                        Err(e) => {
                            warn!("Skipping {label}: {stage} failed: {e}");
                            skipped += 1;
                        }
                    }
                }
                Ok((settled, skipped))
            }
        }
    }
}

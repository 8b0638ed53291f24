use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use image::DynamicImage;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use crate::core::{DecodedImage, EncodeJob, EncodedOutput, ImageId, PreprocessOptions};
use crate::processing::codecs::{apply_preprocessors, encode_output};
use crate::utils::{ConvertError, ConvertResult};

use super::WorkerPool;

struct Slot {
    /// Raw bytes until the first decode
    source: Option<Arc<Vec<u8>>>,
    size: u64,
    image: Option<Arc<DynamicImage>>,
}

/// Worker pool running codec work on tokio's blocking threads.
///
/// A semaphore with `worker_count` permits bounds how many codec jobs run at
/// once. Each permit travels into its blocking task, so [`WorkerPool::close`]
/// also waits for work whose awaiting future was dropped.
pub struct ImagePool {
    semaphore: Arc<Semaphore>,
    worker_count: usize,
    active_workers: Arc<AtomicUsize>,
    slots: Mutex<Vec<Slot>>,
}

impl ImagePool {
    async fn run<T, F>(&self, label: &'static str, job: F) -> ConvertResult<T>
    where
        F: FnOnce() -> ConvertResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ConvertError::pool(format!("Failed to acquire worker: {e}")))?;

        let active_workers = self.active_workers.clone();
        let current = active_workers.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Worker started ({label}) - Active: {current}/{}", self.worker_count);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let result = job();
            active_workers.fetch_sub(1, Ordering::SeqCst);
            result
        })
        .await?
    }

    fn image(&self, id: ImageId) -> ConvertResult<Arc<DynamicImage>> {
        let slots = self.slots.lock();
        slots
            .get(id.0)
            .and_then(|slot| slot.image.clone())
            .ok_or_else(|| ConvertError::pool(format!("Image {} has not been decoded", id.0)))
    }

    fn store(&self, id: ImageId, image: DynamicImage) -> ConvertResult<()> {
        let mut slots = self.slots.lock();
        let slot = slots
            .get_mut(id.0)
            .ok_or_else(|| ConvertError::pool(format!("Unknown image {}", id.0)))?;
        slot.image = Some(Arc::new(image));
        slot.source = None;
        Ok(())
    }
}

impl WorkerPool for ImagePool {
    fn with_workers(worker_count: usize) -> ConvertResult<Self> {
        if worker_count == 0 {
            return Err(ConvertError::pool("Worker count must be at least 1"));
        }
        debug!("Creating image pool with {worker_count} workers");
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(worker_count)),
            worker_count,
            active_workers: Arc::new(AtomicUsize::new(0)),
            slots: Mutex::new(Vec::new()),
        })
    }

    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn ingest(&self, bytes: Vec<u8>) -> ConvertResult<ImageId> {
        if self.semaphore.is_closed() {
            return Err(ConvertError::pool("Worker pool is closed"));
        }
        let mut slots = self.slots.lock();
        slots.push(Slot {
            size: bytes.len() as u64,
            source: Some(Arc::new(bytes)),
            image: None,
        });
        Ok(ImageId(slots.len() - 1))
    }

    async fn decoded(&self, id: ImageId) -> ConvertResult<DecodedImage> {
        let (source, size) = {
            let slots = self.slots.lock();
            let slot = slots
                .get(id.0)
                .ok_or_else(|| ConvertError::pool(format!("Unknown image {}", id.0)))?;
            if slot.image.is_some() {
                return Ok(DecodedImage { id, size: slot.size });
            }
            let source = slot
                .source
                .clone()
                .ok_or_else(|| ConvertError::pool(format!("Image {} has no data", id.0)))?;
            (source, slot.size)
        };

        let image = self
            .run("decode", move || {
                image::load_from_memory(&source)
                    .map_err(|e| ConvertError::processing(format!("Failed to decode image: {e}")))
            })
            .await?;
        self.store(id, image)?;
        Ok(DecodedImage { id, size })
    }

    async fn preprocess(&self, id: ImageId, options: &PreprocessOptions) -> ConvertResult<()> {
        if options.is_empty() {
            return Ok(());
        }
        let image = self.image(id)?;
        let options = options.clone();
        let processed = self
            .run("preprocess", move || apply_preprocessors((*image).clone(), &options))
            .await?;
        self.store(id, processed)
    }

    async fn encode(&self, id: ImageId, job: &EncodeJob) -> ConvertResult<Vec<EncodedOutput>> {
        let image = self.image(id)?;
        let job = Arc::new(job.clone());

        let encodes = job.encoders.iter().map(|(kind, option)| {
            let image = image.clone();
            let job = job.clone();
            let (kind, option) = (*kind, option.clone());
            self.run("encode", move || encode_output(&image, kind, &option, &job))
        });

        futures::future::try_join_all(encodes).await
    }

    async fn close(self) -> ConvertResult<()> {
        let permits = u32::try_from(self.worker_count)
            .map_err(|_| ConvertError::pool("Worker count exceeds semaphore capacity"))?;
        // Waits for blocking tasks that outlived their futures.
        let all = self
            .semaphore
            .acquire_many(permits)
            .await
            .map_err(|e| ConvertError::pool(format!("Failed to drain workers: {e}")))?;
        all.forget();
        self.semaphore.close();

        let leftover = self.active_workers.load(Ordering::SeqCst);
        if leftover != 0 {
            warn!("Closing pool with {leftover} workers still marked active");
        }
        self.slots.lock().clear();
        debug!("Image pool with {} workers closed", self.worker_count);
        Ok(())
    }
}

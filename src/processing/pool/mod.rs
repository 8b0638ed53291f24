//! Worker pool seam between the pipeline coordinator and the codecs.

mod image_pool;

pub use image_pool::ImagePool;

use crate::core::{DecodedImage, EncodeJob, EncodedOutput, ImageId, PreprocessOptions};
use crate::utils::ConvertResult;

/// A fixed-size parallel executor for decode, preprocess and encode work.
///
/// A pool is built for one chunk and closed when the chunk ends. Image ids are
/// only valid for the pool that issued them.
#[allow(async_fn_in_trait)]
pub trait WorkerPool: Sized {
    /// Builds a pool running at most `worker_count` codec jobs at once.
    fn with_workers(worker_count: usize) -> ConvertResult<Self>;

    fn worker_count(&self) -> usize;

    /// Hands raw file bytes to the pool. Decoding happens on [`Self::decoded`].
    fn ingest(&self, bytes: Vec<u8>) -> ConvertResult<ImageId>;

    /// Waits for the image to be decoded.
    async fn decoded(&self, id: ImageId) -> ConvertResult<DecodedImage>;

    /// Replaces the decoded image with its preprocessed version.
    async fn preprocess(&self, id: ImageId, options: &PreprocessOptions) -> ConvertResult<()>;

    /// Encodes the image once per enabled encoder of `job`, in job order.
    async fn encode(&self, id: ImageId, job: &EncodeJob) -> ConvertResult<Vec<EncodedOutput>>;

    /// Waits for in-flight work and releases the workers.
    async fn close(self) -> ConvertResult<()>;
}

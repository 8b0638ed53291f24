pub mod batch;
pub mod codecs;
pub mod pool;

pub use batch::{BatchMetrics, BatchScheduler, PipelineCoordinator, ResultAggregator};
pub use pool::{ImagePool, WorkerPool};

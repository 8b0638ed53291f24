mod coordinator;
mod metrics;
mod processor;
mod results;

pub use coordinator::{PipelineCoordinator, RESULTS_SUMMARY};
pub use metrics::{BatchMetrics, ChunkReport};
pub use processor::BatchScheduler;
pub use results::ResultAggregator;

// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod reporter;

// Public exports for external consumers
pub use crate::core::{FailurePolicy, InputFile, RunConfig};
pub use crate::processing::{BatchMetrics, BatchScheduler, ImagePool, WorkerPool};
pub use crate::utils::{ConvertError, ConvertResult};

// This library file is used as a public API for consuming this crate as a library.
// The command-line entry point is in main.rs.

//! Core types and run configuration.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`RunConfig`]: Immutable snapshot of the run options
//! - [`InputFile`], [`ImageId`], [`DecodedImage`]: What flows into the pool
//! - [`EncodeJob`], [`EncodedOutput`], [`OutputArtifact`]: What flows out of it
//! - [`FileResultRecord`]: Per-file aggregation of outputs
//! - [`ProgressState`]: Offsets for the two-phase completeness fraction

mod config;
mod progress;
mod types;

pub use config::{
    FailurePolicy, PreprocessOptions, RunConfig, DEFAULT_BUTTERAUGLI_TARGET,
    DEFAULT_MAX_OPTIMIZER_ROUNDS,
};
pub use progress::ProgressState;
pub use types::{
    parse_structured_literal, DecodedImage, EncodeJob, EncodedOutput, EncoderOption,
    FileResultRecord, ImageId, InputFile, OutputArtifact,
};

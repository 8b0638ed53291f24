//! Immutable per-run configuration handed to the scheduler and coordinator.

use std::collections::BTreeMap;
use std::path::PathBuf;
use serde::Serialize;
use crate::core::types::{EncodeJob, EncoderOption};
use crate::utils::{ConvertError, ConvertResult, EncoderKind, PreprocessorKind};

pub const DEFAULT_MAX_OPTIMIZER_ROUNDS: u32 = 6;
pub const DEFAULT_BUTTERAUGLI_TARGET: f64 = 1.4;

/// Enabled preprocessors and their parsed options, in application order.
pub type PreprocessOptions = BTreeMap<PreprocessorKind, serde_json::Value>;

/// What happens when a single file fails inside a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The first failure aborts the chunk and ends the run
    #[default]
    Abort,
    /// Failing files are logged and dropped; the rest of the chunk continues
    Skip,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub suffix: String,
    /// Files per chunk and worker count of each pool
    pub concurrency: usize,
    pub max_optimizer_rounds: u32,
    pub butteraugli_target: f64,
    pub preprocessors: PreprocessOptions,
    /// Enabled encoders in capability-table order
    pub encoders: Vec<(EncoderKind, EncoderOption)>,
    pub failure_policy: FailurePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            suffix: String::new(),
            concurrency: num_cpus::get(),
            max_optimizer_rounds: DEFAULT_MAX_OPTIMIZER_ROUNDS,
            butteraugli_target: DEFAULT_BUTTERAUGLI_TARGET,
            preprocessors: PreprocessOptions::new(),
            encoders: Vec::new(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl RunConfig {
    /// Enables an encoder, keeping the list in table order and replacing any
    /// earlier option for the same encoder.
    pub fn with_encoder(mut self, kind: EncoderKind, option: EncoderOption) -> Self {
        self.encoders.retain(|(k, _)| *k != kind);
        self.encoders.push((kind, option));
        self.encoders.sort_by_key(|(k, _)| *k);
        self
    }

    pub fn with_preprocessor(mut self, kind: PreprocessorKind, options: serde_json::Value) -> Self {
        self.preprocessors.insert(kind, options);
        self
    }

    /// Builds the encode job shared by every image of the run.
    pub fn encode_job(&self) -> EncodeJob {
        EncodeJob {
            max_optimizer_rounds: self.max_optimizer_rounds,
            butteraugli_target: self.butteraugli_target,
            encoders: self.encoders.clone(),
        }
    }

    /// Validates values the CLI cannot express through types alone.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.concurrency == 0 {
            return Err(ConvertError::settings("Concurrent file count must be at least 1"));
        }
        if !self.butteraugli_target.is_finite() || self.butteraugli_target <= 0.0 {
            return Err(ConvertError::settings(format!(
                "Invalid optimizer target distance: {}. Must be a positive number",
                self.butteraugli_target
            )));
        }
        for (kind, value) in &self.preprocessors {
            if !value.is_object() {
                return Err(ConvertError::settings(format!(
                    "Options for {kind} must be an object, got {value}"
                )));
            }
        }
        for (kind, option) in &self.encoders {
            if let EncoderOption::Config(value) = option {
                if !value.is_object() {
                    return Err(ConvertError::settings(format!(
                        "Options for {kind} must be an object or \"auto\", got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}

//! Core types flowing through the pipeline.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use crate::utils::{ConvertError, ConvertResult, EncoderKind};

/// A resolved, existence-checked input path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFile(PathBuf);

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Chunk-scoped handle to an image ingested by a worker pool.
///
/// Ids are only meaningful to the pool that issued them and are never reused
/// across chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub usize);

/// A decoded image as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub id: ImageId,
    /// Byte size of the ingested file
    pub size: u64,
}

/// Per-format encoder configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum EncoderOption {
    /// Let the pool pick settings (quality search for tunable encoders)
    Auto,
    /// Parsed structured-literal options
    Config(serde_json::Value),
}

impl EncoderOption {
    /// Parses a flag value. The case-insensitive literal `auto` is the sentinel;
    /// anything else must be a structured literal.
    pub fn parse(raw: &str) -> ConvertResult<Self> {
        if raw.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        parse_structured_literal(raw).map(Self::Config)
    }
}

/// Parses relaxed JSON (JSON5) option text.
pub fn parse_structured_literal(raw: &str) -> ConvertResult<serde_json::Value> {
    json5::from_str(raw)
        .map_err(|e| ConvertError::settings(format!("Invalid option value '{raw}': {e}")))
}

/// Everything the pool needs to encode one image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    pub max_optimizer_rounds: u32,
    pub butteraugli_target: f64,
    /// Enabled encoders in capability-table order
    pub encoders: Vec<(EncoderKind, EncoderOption)>,
}

/// One encoded payload as returned by the pool.
#[derive(Debug, Clone)]
pub struct EncodedOutput {
    pub encoder: EncoderKind,
    pub extension: String,
    pub binary: Vec<u8>,
    pub info_text: Option<String>,
}

impl EncodedOutput {
    pub fn size(&self) -> u64 {
        self.binary.len() as u64
    }
}

/// An encoded output after it was written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct OutputArtifact {
    pub encoder: EncoderKind,
    pub extension: String,
    pub size: u64,
    pub info_text: Option<String>,
    pub output_file: PathBuf,
}

/// Original size and produced outputs of one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResultRecord {
    pub file: InputFile,
    pub size: u64,
    pub outputs: Vec<OutputArtifact>,
}

impl FileResultRecord {
    pub fn new(file: InputFile, size: u64) -> Self {
        Self {
            file,
            size,
            outputs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auto_sentinel_is_never_parsed() {
        assert_eq!(EncoderOption::parse("auto").unwrap(), EncoderOption::Auto);
        assert_eq!(EncoderOption::parse("AUTO").unwrap(), EncoderOption::Auto);
        assert_eq!(EncoderOption::parse(" Auto ").unwrap(), EncoderOption::Auto);
    }

    #[test]
    fn relaxed_literals_are_accepted() {
        let opt = EncoderOption::parse("{quality: 80, lossless: false,}").unwrap();
        assert_eq!(opt, EncoderOption::Config(json!({"quality": 80, "lossless": false})));

        let opt = EncoderOption::parse(r#"{'cqLevel': 28}"#).unwrap();
        assert_eq!(opt, EncoderOption::Config(json!({"cqLevel": 28})));
    }

    #[test]
    fn malformed_literal_is_a_settings_error() {
        let err = EncoderOption::parse("{quality: }").unwrap_err();
        assert!(err.is_fatal_setup());
    }
}

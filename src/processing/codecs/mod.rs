//! Image codec work executed inside the worker pool.
//!
//! # Architecture
//!
//! - [`options`]: Structured-literal option structs per preprocessor and encoder.
//! - [`preprocess`]: Resize, quantize and rotate transforms.
//! - [`encode`]: Maps encoder options to `image`/`webp` encoder calls.
//! - [`auto`]: Quality search behind the `auto` sentinel.

mod auto;
mod encode;
mod options;
mod preprocess;

pub use auto::{auto_encode, rms_distance, AutoEncoded};
pub use encode::EncoderSettings;
pub use preprocess::{apply_preprocessors, validate_preprocessors};

use image::DynamicImage;
use crate::core::{EncodeJob, EncodedOutput, EncoderOption, RunConfig};
use crate::utils::{ConvertError, ConvertResult, EncoderKind};

/// Encodes `image` with one encoder of `job`.
pub fn encode_output(
    image: &DynamicImage,
    kind: EncoderKind,
    option: &EncoderOption,
    job: &EncodeJob,
) -> ConvertResult<EncodedOutput> {
    let (binary, info_text) = match option {
        EncoderOption::Auto if kind.descriptor().tunable => {
            let found = auto_encode(image, kind, job.max_optimizer_rounds, job.butteraugli_target)?;
            let info = format!(
                " (auto: quality {} after {} rounds, distance {:.2})",
                found.quality, found.rounds, found.distance
            );
            (found.binary, Some(info))
        }
        EncoderOption::Auto => (EncoderSettings::defaults(kind).encode(image)?, None),
        EncoderOption::Config(value) => (EncoderSettings::from_value(kind, value)?.encode(image)?, None),
    };

    Ok(EncodedOutput {
        encoder: kind,
        extension: kind.extension().to_string(),
        binary,
        info_text,
    })
}

/// Checks every configured option set against its option struct so bad
/// values surface before any chunk starts.
pub fn check_options(config: &RunConfig) -> ConvertResult<()> {
    validate_preprocessors(&config.preprocessors)
        .map_err(|e| ConvertError::settings(e.to_string()))?;

    for (kind, option) in &config.encoders {
        if let EncoderOption::Config(value) = option {
            EncoderSettings::from_value(*kind, value)
                .map_err(|e| ConvertError::settings(e.to_string()))?;
        }
    }
    Ok(())
}

//! Option structs parsed from structured-literal flag values.
//!
//! Field names follow the camelCase spelling users pass on the command line.
//! Unknown fields are ignored.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use crate::utils::{ConvertError, ConvertResult};

pub(crate) fn from_value<T: DeserializeOwned>(
    owner: impl Display,
    value: &serde_json::Value,
) -> ConvertResult<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| ConvertError::format(format!("Invalid {owner} options {value}: {e}")))
}

// Preprocessors

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMethod {
    Nearest,
    Triangle,
    Catrom,
    Mitchell,
    #[default]
    Lanczos3,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub method: ResizeMethod,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuantOptions {
    pub num_colors: u16,
    pub dither: f32,
}

impl Default for QuantOptions {
    fn default() -> Self {
        Self {
            num_colors: 255,
            dither: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotateOptions {
    /// Clockwise quarter turns
    pub num_rotations: i32,
}

// Encoders

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MozJpegOptions {
    pub quality: f32,
}

impl Default for MozJpegOptions {
    fn default() -> Self {
        Self { quality: 75.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebPOptions {
    pub quality: f32,
    pub lossless: bool,
}

impl Default for WebPOptions {
    fn default() -> Self {
        Self {
            quality: 75.0,
            lossless: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvifOptions {
    /// Takes precedence over `cq_level` when both are set
    pub quality: Option<f32>,
    /// Constant quantizer level, 0 (best) to 63 (worst)
    pub cq_level: u8,
    /// 1 (slowest) to 10 (fastest)
    pub speed: u8,
}

impl Default for AvifOptions {
    fn default() -> Self {
        Self {
            quality: None,
            cq_level: 33,
            speed: 6,
        }
    }
}

impl AvifOptions {
    /// Effective 1-100 quality for the AV1 encoder.
    pub fn effective_quality(&self) -> u8 {
        match self.quality {
            Some(q) => q.clamp(1.0, 100.0).round() as u8,
            None => {
                let cq = u32::from(self.cq_level.min(63));
                ((63 - cq) * 100 / 63).max(1) as u8
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OxiPngOptions {
    /// 0 (fastest) to 6 (smallest)
    pub level: u8,
}

impl Default for OxiPngOptions {
    fn default() -> Self {
        Self { level: 2 }
    }
}

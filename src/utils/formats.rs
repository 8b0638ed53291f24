//! Capability table for encoders and preprocessors.
//!
//! Both the CLI (one flag per entry) and the pipeline coordinator (one option
//! per enabled entry) iterate these tables; nothing else branches on codec names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::utils::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    MozJpeg,
    WebP,
    Avif,
    OxiPng,
}

/// Self-description of one encoder capability.
#[derive(Debug)]
pub struct EncoderDescriptor {
    pub kind: EncoderKind,
    pub name: &'static str,
    pub description: &'static str,
    pub extension: &'static str,
    /// Whether `auto` runs the quality search instead of using defaults
    pub tunable: bool,
}

/// Registered encoders, indexed by `EncoderKind as usize`.
pub const ENCODERS: [EncoderDescriptor; 4] = [
    EncoderDescriptor {
        kind: EncoderKind::MozJpeg,
        name: "mozjpeg",
        description: "Baseline JPEG encoder",
        extension: "jpg",
        tunable: true,
    },
    EncoderDescriptor {
        kind: EncoderKind::WebP,
        name: "webp",
        description: "libwebp encoder (lossy or lossless)",
        extension: "webp",
        tunable: true,
    },
    EncoderDescriptor {
        kind: EncoderKind::Avif,
        name: "avif",
        description: "AV1 image encoder",
        extension: "avif",
        tunable: false,
    },
    EncoderDescriptor {
        kind: EncoderKind::OxiPng,
        name: "oxipng",
        description: "Lossless PNG encoder",
        extension: "png",
        tunable: false,
    },
];

impl EncoderKind {
    pub fn descriptor(self) -> &'static EncoderDescriptor {
        &ENCODERS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Get the file extension written for this encoder
    pub fn extension(self) -> &'static str {
        self.descriptor().extension
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EncoderKind {
    type Err = ConvertError;

    /// Accepts either the encoder name or its output extension.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        ENCODERS
            .iter()
            .find(|d| d.name == s || d.extension == s)
            .map(|d| d.kind)
            .ok_or_else(|| ConvertError::format(format!("Unsupported encoder: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessorKind {
    Resize,
    Quant,
    Rotate,
}

#[derive(Debug)]
pub struct PreprocessorDescriptor {
    pub kind: PreprocessorKind,
    pub name: &'static str,
    pub description: &'static str,
}

/// Registered preprocessors in application order.
pub const PREPROCESSORS: [PreprocessorDescriptor; 3] = [
    PreprocessorDescriptor {
        kind: PreprocessorKind::Resize,
        name: "resize",
        description: "Resize the image before encoding",
    },
    PreprocessorDescriptor {
        kind: PreprocessorKind::Quant,
        name: "quant",
        description: "Reduce the color palette",
    },
    PreprocessorDescriptor {
        kind: PreprocessorKind::Rotate,
        name: "rotate",
        description: "Rotate image in quarter turns",
    },
];

impl PreprocessorKind {
    pub fn descriptor(self) -> &'static PreprocessorDescriptor {
        &PREPROCESSORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for PreprocessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreprocessorKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        PREPROCESSORS
            .iter()
            .find(|d| d.name == s)
            .map(|d| d.kind)
            .ok_or_else(|| ConvertError::format(format!("Unsupported preprocessor: {s}")))
    }
}

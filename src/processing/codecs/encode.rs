//! Maps encoder options to concrete encoder calls.
//!
//! Every encoder writes into an in-memory buffer; the coordinator decides
//! where the bytes end up on disk.

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use crate::utils::{ConvertError, ConvertResult, EncoderKind};

use super::options::{from_value, AvifOptions, MozJpegOptions, OxiPngOptions, WebPOptions};

type Result<T> = ConvertResult<T>;

/// Resolved options for one encoder.
#[derive(Debug, Clone)]
pub enum EncoderSettings {
    MozJpeg(MozJpegOptions),
    WebP(WebPOptions),
    Avif(AvifOptions),
    OxiPng(OxiPngOptions),
}

impl EncoderSettings {
    pub fn defaults(kind: EncoderKind) -> Self {
        match kind {
            EncoderKind::MozJpeg => Self::MozJpeg(MozJpegOptions::default()),
            EncoderKind::WebP => Self::WebP(WebPOptions::default()),
            EncoderKind::Avif => Self::Avif(AvifOptions::default()),
            EncoderKind::OxiPng => Self::OxiPng(OxiPngOptions::default()),
        }
    }

    pub fn from_value(kind: EncoderKind, value: &serde_json::Value) -> Result<Self> {
        Ok(match kind {
            EncoderKind::MozJpeg => Self::MozJpeg(from_value(kind, value)?),
            EncoderKind::WebP => Self::WebP(from_value(kind, value)?),
            EncoderKind::Avif => Self::Avif(from_value(kind, value)?),
            EncoderKind::OxiPng => Self::OxiPng(from_value(kind, value)?),
        })
    }

    /// Copy of these settings with the quality knob replaced.
    /// Lossless encoders are returned unchanged.
    pub fn with_quality(&self, quality: f32) -> Self {
        match self {
            Self::MozJpeg(_) => Self::MozJpeg(MozJpegOptions { quality }),
            Self::WebP(o) => Self::WebP(WebPOptions { quality, lossless: o.lossless }),
            Self::Avif(o) => Self::Avif(AvifOptions { quality: Some(quality), ..o.clone() }),
            Self::OxiPng(o) => Self::OxiPng(o.clone()),
        }
    }

    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        match self {
            Self::MozJpeg(o) => encode_jpeg(image, o),
            Self::WebP(o) => encode_webp(image, o),
            Self::Avif(o) => encode_avif(image, o),
            Self::OxiPng(o) => encode_png(image, o),
        }
    }
}

fn to_percent(quality: f32) -> u8 {
    quality.clamp(1.0, 100.0).round() as u8
}

/// Saves `image` as baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(image: &DynamicImage, opts: &MozJpegOptions) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, to_percent(opts.quality))
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ConvertError::processing(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

/// Saves `image` as WebP, lossy unless `lossless` is set.
pub fn encode_webp(image: &DynamicImage, opts: &WebPOptions) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    let quality = if opts.lossless { 75.0 } else { opts.quality.clamp(0.0, 100.0) };
    let memory = encoder
        .encode_simple(opts.lossless, quality)
        .map_err(|e| ConvertError::processing(format!("WebP encode failed: {e:?}")))?;
    // WebPMemory is !Send; copy out before leaving the blocking task.
    Ok(memory.to_vec())
}

/// Saves `image` as AVIF.
pub fn encode_avif(image: &DynamicImage, opts: &AvifOptions) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let mut buf = Vec::new();
    AvifEncoder::new_with_speed_quality(&mut buf, opts.speed.clamp(1, 10), opts.effective_quality())
        .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
        .map_err(|e| ConvertError::processing(format!("AVIF encode failed: {e}")))?;
    Ok(buf)
}

/// Saves `image` as PNG with adaptive filtering. Lossless at every level.
pub fn encode_png(image: &DynamicImage, opts: &OxiPngOptions) -> Result<Vec<u8>> {
    let compression = match opts.level {
        0 | 1 => CompressionType::Fast,
        2 | 3 => CompressionType::Default,
        _ => CompressionType::Best,
    };
    let mut buf = Vec::new();
    image
        .write_with_encoder(PngEncoder::new_with_quality(&mut buf, compression, PngFilter::Adaptive))
        .map_err(|e| ConvertError::processing(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use serde_json::json;

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 200, 255])
        }))
    }

    #[test]
    fn jpeg_and_png_outputs_are_readable() {
        let jpg = EncoderSettings::defaults(EncoderKind::MozJpeg).encode(&sample()).unwrap();
        assert_eq!(image::guess_format(&jpg).unwrap(), ImageFormat::Jpeg);

        let png = EncoderSettings::defaults(EncoderKind::OxiPng).encode(&sample()).unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back, sample().to_rgba8());
    }

    #[test]
    fn webp_output_has_riff_header() {
        let settings = EncoderSettings::from_value(EncoderKind::WebP, &json!({"quality": 60})).unwrap();
        let bytes = settings.encode(&sample()).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn oversized_webp_is_an_error() {
        // libwebp caps both sides at 16383 pixels
        let wide = DynamicImage::new_rgba8(16384, 1);
        assert!(EncoderSettings::defaults(EncoderKind::WebP).encode(&wide).is_err());

        let lossless = EncoderSettings::from_value(EncoderKind::WebP, &json!({"lossless": true})).unwrap();
        assert!(lossless.encode(&wide).is_err());
    }

    #[test]
    fn with_quality_leaves_lossless_png_alone() {
        let settings = EncoderSettings::defaults(EncoderKind::OxiPng).with_quality(10.0);
        assert!(matches!(settings, EncoderSettings::OxiPng(OxiPngOptions { level: 2 })));
    }
}

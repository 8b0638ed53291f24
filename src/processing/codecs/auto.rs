//! Quality search used when an encoder is given `auto`.

use image::{DynamicImage, RgbaImage};
use tracing::debug;
use crate::utils::{ConvertResult, EncoderKind};

use super::encode::EncoderSettings;

const MIN_QUALITY: f32 = 0.0;
const MAX_QUALITY: f32 = 100.0;

/// Result of a quality search.
#[derive(Debug)]
pub struct AutoEncoded {
    pub binary: Vec<u8>,
    pub quality: f32,
    pub rounds: u32,
    pub distance: f64,
}

/// Binary-searches the quality range for the lowest setting whose decoded
/// output stays within `target_distance` of `image`, spending at most
/// `max_rounds` encode/decode round trips. Falls back to maximum quality when
/// no attempt meets the target.
pub fn auto_encode(
    image: &DynamicImage,
    kind: EncoderKind,
    max_rounds: u32,
    target_distance: f64,
) -> ConvertResult<AutoEncoded> {
    let base = EncoderSettings::defaults(kind);
    let reference = reference_for(image, kind);

    let (mut lo, mut hi) = (MIN_QUALITY, MAX_QUALITY);
    let mut best: Option<AutoEncoded> = None;
    let mut rounds = 0;

    while rounds < max_rounds.max(1) {
        let quality = ((lo + hi) / 2.0).round();
        rounds += 1;

        let attempt = base.with_quality(quality).encode(image)?;
        let decoded = image::load_from_memory(&attempt)?.to_rgba8();
        let distance = rms_distance(&reference, &decoded);
        debug!("{kind} auto round {rounds}: quality {quality} → distance {distance:.3}");

        if distance <= target_distance {
            hi = quality;
            best = Some(AutoEncoded { binary: attempt, quality, rounds, distance });
        } else {
            lo = quality;
        }

        if hi - lo <= 1.0 {
            break;
        }
    }

    match best {
        Some(found) => Ok(AutoEncoded { rounds, ..found }),
        None => {
            let binary = base.with_quality(MAX_QUALITY).encode(image)?;
            let decoded = image::load_from_memory(&binary)?.to_rgba8();
            Ok(AutoEncoded {
                distance: rms_distance(&reference, &decoded),
                binary,
                quality: MAX_QUALITY,
                rounds,
            })
        }
    }
}

/// What a lossless round trip through `kind` would give back. JPEG has no
/// alpha channel, so its attempts are measured against the opaque image.
fn reference_for(image: &DynamicImage, kind: EncoderKind) -> RgbaImage {
    match kind {
        EncoderKind::MozJpeg => DynamicImage::ImageRgb8(image.to_rgb8()).to_rgba8(),
        _ => image.to_rgba8(),
    }
}

/// Root-mean-square difference over all RGBA channels, as a percentage of the
/// channel range. Images of different dimensions are infinitely far apart.
pub fn rms_distance(a: &RgbaImage, b: &RgbaImage) -> f64 {
    if a.dimensions() != b.dimensions() {
        return f64::INFINITY;
    }
    let samples = a.as_raw().len();
    if samples == 0 {
        return 0.0;
    }
    let sum: f64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum();
    (sum / samples as f64).sqrt() / 255.0 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(24, 24, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, ((x + y) * 5) as u8, 255])
        }))
    }

    #[test]
    fn identical_images_have_zero_distance() {
        let img = sample().to_rgba8();
        assert_eq!(rms_distance(&img, &img), 0.0);
        assert_eq!(rms_distance(&img, &RgbaImage::new(1, 1)), f64::INFINITY);
    }

    #[test]
    fn search_respects_round_budget() {
        let found = auto_encode(&sample(), EncoderKind::MozJpeg, 3, 1.4).unwrap();
        assert!(found.rounds <= 3);
        assert!(!found.binary.is_empty());
    }

    #[test]
    fn translucent_input_can_meet_the_jpeg_target() {
        let translucent = DynamicImage::ImageRgba8(RgbaImage::from_fn(24, 24, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, 90, 64])
        }));
        let found = auto_encode(&translucent, EncoderKind::MozJpeg, 6, 5.0).unwrap();
        assert!(found.quality < 100.0, "fell back to quality {}", found.quality);
        assert!(found.distance <= 5.0);
    }

    #[test]
    fn loose_target_settles_on_low_quality() {
        let loose = auto_encode(&sample(), EncoderKind::MozJpeg, 8, 50.0).unwrap();
        let strict = auto_encode(&sample(), EncoderKind::MozJpeg, 8, 0.5).unwrap();
        assert!(loose.quality <= strict.quality);
        assert!(loose.distance <= 50.0);
    }
}

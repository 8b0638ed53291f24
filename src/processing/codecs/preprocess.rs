//! Encoder-agnostic transforms applied between decode and encode.

use image::DynamicImage;
use image::imageops::FilterType;
use crate::core::PreprocessOptions;
use crate::utils::{ConvertError, ConvertResult, PreprocessorKind};

use super::options::{from_value, QuantOptions, ResizeMethod, ResizeOptions, RotateOptions};

type Result<T> = ConvertResult<T>;

/// Applies every enabled preprocessor in table order.
pub fn apply_preprocessors(mut image: DynamicImage, options: &PreprocessOptions) -> Result<DynamicImage> {
    for (kind, value) in options {
        image = match kind {
            PreprocessorKind::Resize => resize(image, &from_value(kind, value)?)?,
            PreprocessorKind::Quant => quantize(image, &from_value(kind, value)?),
            PreprocessorKind::Rotate => rotate(image, &from_value(kind, value)?),
        };
    }
    Ok(image)
}

/// Parses every enabled preprocessor's options without touching pixels.
pub fn validate_preprocessors(options: &PreprocessOptions) -> Result<()> {
    for (kind, value) in options {
        match kind {
            PreprocessorKind::Resize => check_dimensions(&from_value(kind, value)?)?,
            PreprocessorKind::Quant => {
                from_value::<QuantOptions>(kind, value)?;
            }
            PreprocessorKind::Rotate => {
                from_value::<RotateOptions>(kind, value)?;
            }
        }
    }
    Ok(())
}

fn check_dimensions(opts: &ResizeOptions) -> Result<()> {
    if opts.width == Some(0) || opts.height == Some(0) {
        return Err(ConvertError::processing("Resize dimensions cannot be 0"));
    }
    Ok(())
}

/// Resizes to the requested box. When only one side is given the other one
/// follows the source aspect ratio. No-op when neither side is set.
pub fn resize(image: DynamicImage, opts: &ResizeOptions) -> Result<DynamicImage> {
    check_dimensions(opts)?;
    let (orig_w, orig_h) = (image.width(), image.height());

    let (target_w, target_h) = match (opts.width, opts.height) {
        (None, None) => return Ok(image),
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale_side(orig_h, w, orig_w)),
        (None, Some(h)) => (scale_side(orig_w, h, orig_h), h),
    };

    if (target_w, target_h) == (orig_w, orig_h) {
        return Ok(image);
    }

    Ok(image.resize_exact(target_w, target_h, filter_for(opts.method)))
}

fn scale_side(side: u32, target: u32, reference: u32) -> u32 {
    if reference == 0 {
        return target;
    }
    ((f64::from(side) * f64::from(target) / f64::from(reference)).round() as u32).max(1)
}

fn filter_for(method: ResizeMethod) -> FilterType {
    match method {
        ResizeMethod::Nearest => FilterType::Nearest,
        ResizeMethod::Triangle => FilterType::Triangle,
        ResizeMethod::Catrom => FilterType::CatmullRom,
        // Closest smooth cubic the image crate offers
        ResizeMethod::Mitchell => FilterType::Gaussian,
        ResizeMethod::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Rotates clockwise by `num_rotations` quarter turns.
pub fn rotate(image: DynamicImage, opts: &RotateOptions) -> DynamicImage {
    match opts.num_rotations.rem_euclid(4) {
        1 => image.rotate90(),
        2 => image.rotate180(),
        3 => image.rotate270(),
        _ => image,
    }
}

/// Reduces the image to at most `num_colors` RGB colours, diffusing the
/// quantization error (Floyd–Steinberg) scaled by `dither`. Alpha is left
/// untouched.
///
/// Eight or more colours use a uniform RGB lattice. Fewer colours cannot
/// cover all three channels, so the image is reduced to evenly spaced grey
/// levels instead.
pub fn quantize(image: DynamicImage, opts: &QuantOptions) -> DynamicImage {
    let num_colors = u32::from(opts.num_colors.clamp(2, 256));
    let dither = opts.dither.clamp(0.0, 1.0);
    let mut rgba = image.to_rgba8();

    let levels = if num_colors < 8 {
        for pixel in rgba.pixels_mut() {
            let luma = 0.299 * f32::from(pixel[0]) + 0.587 * f32::from(pixel[1]) + 0.114 * f32::from(pixel[2]);
            let luma = luma.round().clamp(0.0, 255.0) as u8;
            pixel[0] = luma;
            pixel[1] = luma;
            pixel[2] = luma;
        }
        num_colors
    } else {
        (2..=7).rev().find(|l| l * l * l <= num_colors).unwrap_or(2)
    };
    let step = 255.0 / (levels - 1) as f32;

    let (w, h) = rgba.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut errors = vec![[0f32; 3]; w * h];

    for y in 0..h {
        for x in 0..w {
            let pixel = rgba.get_pixel_mut(x as u32, y as u32);
            let carried = errors[y * w + x];

            for c in 0..3 {
                let value = (f32::from(pixel[c]) + carried[c]).clamp(0.0, 255.0);
                let quantized = (value / step).round() * step;
                pixel[c] = quantized.round() as u8;

                let err = (value - quantized) * dither;
                if err == 0.0 {
                    continue;
                }
                if x + 1 < w {
                    errors[y * w + x + 1][c] += err * 7.0 / 16.0;
                }
                if y + 1 < h {
                    if x > 0 {
                        errors[(y + 1) * w + x - 1][c] += err * 3.0 / 16.0;
                    }
                    errors[(y + 1) * w + x][c] += err * 5.0 / 16.0;
                    if x + 1 < w {
                        errors[(y + 1) * w + x + 1][c] += err / 16.0;
                    }
                }
            }
        }
    }

    DynamicImage::ImageRgba8(rgba)
}

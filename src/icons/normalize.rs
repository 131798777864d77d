use crate::core::config::IconBounds;
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};

/// Uniform scale factor that fits `width`×`height` into `bounds`.
///
/// `None` when no scaling applies: the image already fits (and `upsize` is
/// off) or the bounds constrain nothing.
pub fn scale_factor(width: u32, height: u32, bounds: IconBounds, upsize: bool) -> Option<f64> {
    if width == 0 || height == 0 {
        return None;
    }

    let width_ratio = bounds.max_width.map(|max| max as f64 / width as f64);
    let height_ratio = bounds.max_height.map(|max| max as f64 / height as f64);

    let factor = match (width_ratio, height_ratio) {
        (Some(w), Some(h)) => w.min(h),
        (Some(w), None) => w,
        (None, Some(h)) => h,
        (None, None) => return None,
    };

    let exceeds = factor < 1.0;
    if exceeds || (upsize && factor > 1.0) {
        Some(factor)
    } else {
        None
    }
}

/// Output dimensions of `width`×`height` scaled by `factor`, never below 1
pub fn target_size(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * factor).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Converts `image` to an RGBA buffer that fits `bounds`
pub fn normalize(image: &DynamicImage, bounds: IconBounds, upsize: bool) -> RgbaImage {
    let (width, height) = image.dimensions();
    let rgba = image.to_rgba8();

    match scale_factor(width, height, bounds, upsize) {
        Some(factor) => {
            let (target_width, target_height) = target_size(width, height, factor);
            log::trace!(
                "resizing icon {}x{} -> {}x{}",
                width,
                height,
                target_width,
                target_height
            );
            imageops::resize(&rgba, target_width, target_height, FilterType::Triangle)
        }
        None => rgba,
    }
}

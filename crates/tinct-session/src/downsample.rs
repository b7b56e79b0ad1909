//! Fitting the source image into the preview bounding box.
//!
//! The display copy is what every preview transform runs against, so it
//! is built once per session and never touched again. It preserves the
//! aspect ratio of the source and is never larger than the source.

use std::fmt;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::types::{CanonicalImage, DisplaySize};

/// Resampling filter used when shrinking the display copy.
///
/// Ordered from fastest/lowest-quality to slowest/highest-quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DownsampleFilter {
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom): moderate speed, good quality.
    CatmullRom,
    /// Gaussian: moderate speed, smooth output.
    Gaussian,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl DownsampleFilter {
    /// Convert to the `image` crate's `FilterType`.
    const fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for DownsampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => f.write_str("Nearest"),
            Self::Triangle => f.write_str("Triangle"),
            Self::CatmullRom => f.write_str("CatmullRom"),
            Self::Gaussian => f.write_str("Gaussian"),
            Self::Lanczos3 => f.write_str("Lanczos3"),
        }
    }
}

/// Compute the dimensions of `(width, height)` scaled to fit inside
/// `bounds`.
///
/// The scale factor is `min(bounds.width / width, bounds.height / height, 1)`,
/// so the result never exceeds the source or the bounds. The limiting side
/// lands exactly on the bound; the other side is rounded down, but never
/// below one pixel. Integer arithmetic keeps the limiting side exact.
#[must_use]
pub fn fitted_dimensions(width: u32, height: u32, bounds: DisplaySize) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= bounds.width && height <= bounds.height) {
        return (width, height);
    }
    let (w, h) = (u64::from(width), u64::from(height));
    let (bw, bh) = (u64::from(bounds.width), u64::from(bounds.height));

    // Width-limited when bw / w <= bh / h.
    let (fitted_w, fitted_h) = if bw * h <= bh * w {
        (bw, h * bw / w)
    } else {
        (w * bh / h, bh)
    };
    (at_least_one(fitted_w), at_least_one(fitted_h))
}

fn at_least_one(side: u64) -> u32 {
    u32::try_from(side.max(1)).unwrap_or(u32::MAX)
}

/// Shrink `image` so it fits inside `bounds`, using the specified
/// resampling filter.
///
/// Returns the (possibly unchanged) image and whether resampling was
/// actually applied. Images already inside the bounds are cloned, never
/// upscaled.
#[must_use]
pub fn fit_within(
    image: &CanonicalImage,
    bounds: DisplaySize,
    filter: DownsampleFilter,
) -> (CanonicalImage, bool) {
    let (w, h) = image.dimensions();
    let (fitted_w, fitted_h) = fitted_dimensions(w, h, bounds);
    if (fitted_w, fitted_h) == (w, h) {
        return (image.clone(), false);
    }

    let resized = image::imageops::resize(image, fitted_w, fitted_h, filter.to_image_filter());
    (resized, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(w: u32, h: u32) -> CanonicalImage {
        CanonicalImage::from_pixel(w, h, image::Rgb([128, 128, 128]))
    }

    #[test]
    fn default_filter_is_triangle() {
        assert_eq!(DownsampleFilter::default(), DownsampleFilter::Triangle);
    }

    #[test]
    fn no_resample_when_already_small() {
        let img = test_image(100, 80);
        let (result, applied) = fit_within(&img, DisplaySize::new(640, 480), DownsampleFilter::Triangle);
        assert!(!applied);
        assert_eq!(result.dimensions(), (100, 80));
        assert_eq!(result, img);
    }

    #[test]
    fn no_resample_when_exact_match() {
        let img = test_image(640, 480);
        let (result, applied) = fit_within(&img, DisplaySize::new(640, 480), DownsampleFilter::Triangle);
        assert!(!applied);
        assert_eq!(result.dimensions(), (640, 480));
    }

    #[test]
    fn landscape_limited_by_width() {
        let img = test_image(1280, 720);
        let (result, applied) = fit_within(&img, DisplaySize::new(640, 480), DownsampleFilter::Triangle);
        assert!(applied);
        // scale = min(0.5, 0.667) = 0.5
        assert_eq!(result.dimensions(), (640, 360));
    }

    #[test]
    fn portrait_limited_by_height() {
        let img = test_image(600, 1200);
        let (result, applied) = fit_within(&img, DisplaySize::new(640, 480), DownsampleFilter::Triangle);
        assert!(applied);
        // scale = min(1.067, 0.4) = 0.4
        assert_eq!(result.dimensions(), (240, 480));
    }

    #[test]
    fn one_side_too_large_still_shrinks_both() {
        let img = test_image(500, 1000);
        let (result, applied) = fit_within(&img, DisplaySize::new(800, 600), DownsampleFilter::Nearest);
        assert!(applied);
        assert_eq!(result.dimensions(), (300, 600));
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        assert_eq!(fitted_dimensions(10_000, 2, DisplaySize::new(100, 100)), (100, 1));
        assert_eq!(fitted_dimensions(3, 9_000, DisplaySize::new(50, 50)), (1, 50));
    }

    #[test]
    fn fitted_dimensions_never_exceed_bounds_or_source() {
        let bounds = DisplaySize::new(37, 23);
        for w in [1, 5, 23, 36, 37, 38, 100, 997] {
            for h in [1, 7, 22, 23, 24, 61, 1013] {
                let (fw, fh) = fitted_dimensions(w, h, bounds);
                assert!(fw <= w && fh <= h, "{w}x{h} grew to {fw}x{fh}");
                assert!(fw <= bounds.width && fh <= bounds.height, "{w}x{h} -> {fw}x{fh}");
                assert!(fw >= 1 && fh >= 1);
            }
        }
    }

    #[test]
    fn filter_display_names() {
        assert_eq!(DownsampleFilter::CatmullRom.to_string(), "CatmullRom");
        assert_eq!(DownsampleFilter::Lanczos3.to_string(), "Lanczos3");
    }
}

//! Sharpening filters: Laplacian, Sobel and Prewitt.
//!
//! [`laplacian`] sharpens each channel by subtracting its 4-neighbour
//! Laplacian. [`sobel`] and [`prewitt`] compute horizontal and vertical
//! gradients of the luma channel, combine their magnitudes with a bitwise
//! OR, and add the resulting edge map to every color channel, so edges
//! brighten while flat regions stay untouched.
//!
//! Gradients are computed with `imageproc`'s clamped 3x3 filters, which
//! replicate the border pixels.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::{filter_clamped, laplacian_filter};
use imageproc::kernel::{self, Kernel};
use tinct_session::CanonicalImage;

use crate::channels;

/// Subtract the 4-neighbour Laplacian from every channel.
#[must_use = "returns the sharpened image"]
pub fn laplacian(image: &CanonicalImage) -> CanonicalImage {
    channels::map(image, |channel| {
        let lap: Image<Luma<i16>> = laplacian_filter(channel);
        GrayImage::from_fn(channel.width(), channel.height(), |x, y| {
            let v = i16::from(channel.get_pixel(x, y).0[0]) - lap.get_pixel(x, y).0[0];
            Luma([clamp_to_u8(v)])
        })
    })
}

/// Brighten edges found by the Sobel operator.
#[must_use = "returns the sharpened image"]
pub fn sobel(image: &CanonicalImage) -> CanonicalImage {
    add_edges(image, kernel::SOBEL_HORIZONTAL_3X3, kernel::SOBEL_VERTICAL_3X3)
}

/// Brighten edges found by the Prewitt operator.
#[must_use = "returns the sharpened image"]
pub fn prewitt(image: &CanonicalImage) -> CanonicalImage {
    add_edges(image, kernel::PREWITT_HORIZONTAL_3X3, kernel::PREWITT_VERTICAL_3X3)
}

/// Edge map of the luma channel: `|gx| | |gy|`, each magnitude saturated
/// to 255.
#[must_use]
pub fn edge_map(
    image: &CanonicalImage,
    horizontal: Kernel<'static, i32>,
    vertical: Kernel<'static, i32>,
) -> GrayImage {
    let luma = image::imageops::grayscale(image);
    let gx: Image<Luma<i16>> = filter_clamped(&luma, horizontal);
    let gy: Image<Luma<i16>> = filter_clamped(&luma, vertical);
    GrayImage::from_fn(luma.width(), luma.height(), |x, y| {
        let h = magnitude(gx.get_pixel(x, y).0[0]);
        let v = magnitude(gy.get_pixel(x, y).0[0]);
        Luma([h | v])
    })
}

fn add_edges(
    image: &CanonicalImage,
    horizontal: Kernel<'static, i32>,
    vertical: Kernel<'static, i32>,
) -> CanonicalImage {
    let edges = edge_map(image, horizontal, vertical);
    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let edge = edges.get_pixel(x, y).0[0];
        pixel.0 = pixel.0.map(|c| c.saturating_add(edge));
    }
    out
}

fn magnitude(gradient: i16) -> u8 {
    u8::try_from(gradient.unsigned_abs()).unwrap_or(u8::MAX)
}

fn clamp_to_u8(v: i16) -> u8 {
    u8::try_from(v.max(0)).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Vertical step edge between two gray levels at x = 5.
    fn step(left: u8, right: u8) -> CanonicalImage {
        CanonicalImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([left; 3])
            } else {
                Rgb([right; 3])
            }
        })
    }

    #[test]
    fn flat_image_is_unchanged() {
        let img = CanonicalImage::from_pixel(8, 6, Rgb([30, 90, 200]));
        assert_eq!(laplacian(&img), img);
        assert_eq!(sobel(&img), img);
        assert_eq!(prewitt(&img), img);
    }

    #[test]
    fn laplacian_steepens_step() {
        let out = laplacian(&step(100, 150));
        // Dark side gets darker, bright side brighter, by the step height.
        assert_eq!(out.get_pixel(4, 5).0, [50, 50, 50]);
        assert_eq!(out.get_pixel(5, 5).0, [200, 200, 200]);
        assert_eq!(out.get_pixel(1, 5).0, [100, 100, 100]);
        assert_eq!(out.get_pixel(8, 5).0, [150, 150, 150]);
    }

    #[test]
    fn laplacian_clips_to_range() {
        let out = laplacian(&step(0, 255));
        assert_eq!(out.get_pixel(4, 5).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(5, 5).0, [255, 255, 255]);
    }

    #[test]
    fn sobel_brightens_edge_only() {
        let img = step(100, 150);
        let out = sobel(&img);
        assert_eq!(out.get_pixel(4, 5).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(5, 5).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(1, 5), img.get_pixel(1, 5));
        assert_eq!(out.get_pixel(8, 5), img.get_pixel(8, 5));
    }

    #[test]
    fn prewitt_is_gentler_than_sobel() {
        let img = step(100, 150);
        let p = prewitt(&img).get_pixel(4, 5).0[0];
        // Prewitt weights each row equally: 3 * 50 added to 100.
        assert!((240..=254).contains(&p), "prewitt edge {p}");
        assert_eq!(prewitt(&img).get_pixel(1, 5), img.get_pixel(1, 5));
    }

    #[test]
    fn edge_map_is_symmetric_for_horizontal_edges() {
        let img = CanonicalImage::from_fn(10, 10, |_, y| if y < 5 { Rgb([0; 3]) } else { Rgb([60; 3]) });
        let edges = edge_map(&img, kernel::SOBEL_HORIZONTAL_3X3, kernel::SOBEL_VERTICAL_3X3);
        assert_eq!(edges.get_pixel(5, 4).0[0], 240);
        assert_eq!(edges.get_pixel(5, 0).0[0], 0);
    }

    #[test]
    fn edges_are_added_to_every_channel_saturating() {
        let img = CanonicalImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([10, 200, 250])
            } else {
                Rgb([10, 200, 250].map(|c: u8| c.saturating_add(40)))
            }
        });
        let out = sobel(&img);
        let p = out.get_pixel(4, 5).0;
        assert!(p[0] > 10);
        assert_eq!(p[2], 255);
    }
}

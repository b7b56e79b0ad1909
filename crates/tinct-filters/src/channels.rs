//! Per-channel helpers.
//!
//! Most `imageproc` filters only accept `GrayImage`, so color filters
//! split the image into one gray image per channel, filter each, and
//! reassemble. Every filter in this crate is a per-channel operation, so
//! the result equals filtering in color space.

use image::{GrayImage, Luma, Rgb};
use tinct_session::CanonicalImage;

/// Split an RGB image into its three channels.
#[must_use]
pub fn split(image: &CanonicalImage) -> [GrayImage; 3] {
    let (w, h) = image.dimensions();
    std::array::from_fn(|c| GrayImage::from_fn(w, h, |x, y| Luma([image.get_pixel(x, y).0[c]])))
}

/// Reassemble three equally-sized channels into an RGB image.
#[must_use]
pub fn merge(channels: &[GrayImage; 3]) -> CanonicalImage {
    let (w, h) = channels[0].dimensions();
    CanonicalImage::from_fn(w, h, |x, y| {
        Rgb([
            channels[0].get_pixel(x, y).0[0],
            channels[1].get_pixel(x, y).0[0],
            channels[2].get_pixel(x, y).0[0],
        ])
    })
}

/// Apply a gray-image filter independently to each channel.
#[must_use]
pub fn map<F>(image: &CanonicalImage, filter: F) -> CanonicalImage
where
    F: Fn(&GrayImage) -> GrayImage,
{
    let channels = split(image);
    let filtered: [GrayImage; 3] = std::array::from_fn(|c| filter(&channels[c]));
    merge(&filtered)
}

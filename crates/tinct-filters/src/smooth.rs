//! Smoothing filters: Gaussian, mean, median, min and max.
//!
//! All of them take a square kernel size. Sizes must lie within
//! [`MIN_KERNEL`]..=[`MAX_KERNEL`]; even sizes are rounded up to the next
//! odd size so the kernel has a center pixel. A size of one is the
//! identity for every filter.

use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};
use tinct_session::CanonicalImage;

use crate::channels;
use crate::error::FilterError;

/// Smallest accepted kernel size.
pub const MIN_KERNEL: u32 = 1;

/// Largest accepted kernel size.
pub const MAX_KERNEL: u32 = 21;

/// Kernel size used by the stock smoothing menu.
pub const DEFAULT_KERNEL: u32 = 3;

/// Validate a kernel size and round it up to odd.
///
/// # Errors
///
/// Returns [`FilterError::KernelSize`] if `ksize` is outside
/// [`MIN_KERNEL`]..=[`MAX_KERNEL`].
pub fn kernel_size(ksize: u32) -> Result<u32, FilterError> {
    if !(MIN_KERNEL..=MAX_KERNEL).contains(&ksize) {
        return Err(FilterError::KernelSize {
            got: ksize,
            min: MIN_KERNEL,
            max: MAX_KERNEL,
        });
    }
    Ok(ksize | 1)
}

/// Gaussian sigma implied by an odd kernel size.
///
/// Uses the conventional `0.3 * ((k - 1) * 0.5 - 1) + 0.8` rule, which
/// gives 0.8 for a 3x3 kernel and grows linearly from there.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sigma_for(ksize: u32) -> f32 {
    0.3f32.mul_add(ksize.saturating_sub(1) as f32 * 0.5 - 1.0, 0.8)
}

/// Gaussian blur with a sigma derived from `ksize`.
///
/// # Errors
///
/// Returns [`FilterError::KernelSize`] for an unsupported kernel size.
pub fn gaussian(image: &CanonicalImage, ksize: u32) -> Result<CanonicalImage, FilterError> {
    let k = kernel_size(ksize)?;
    if k == 1 {
        return Ok(image.clone());
    }
    let sigma = sigma_for(k);
    Ok(channels::map(image, |g| imageproc::filter::gaussian_blur_f32(g, sigma)))
}

/// Mean (box) blur over a `ksize` x `ksize` window.
///
/// # Errors
///
/// Returns [`FilterError::KernelSize`] for an unsupported kernel size.
pub fn mean(image: &CanonicalImage, ksize: u32) -> Result<CanonicalImage, FilterError> {
    let k = kernel_size(ksize)?;
    if k == 1 {
        return Ok(image.clone());
    }
    let r = k / 2;
    Ok(channels::map(image, |g| imageproc::filter::box_filter(g, r, r)))
}

/// Median over a `ksize` x `ksize` window, per channel.
///
/// # Errors
///
/// Returns [`FilterError::KernelSize`] for an unsupported kernel size.
pub fn median(image: &CanonicalImage, ksize: u32) -> Result<CanonicalImage, FilterError> {
    let k = kernel_size(ksize)?;
    if k == 1 {
        return Ok(image.clone());
    }
    let r = k / 2;
    Ok(imageproc::filter::median_filter(image, r, r))
}

/// Minimum over a `ksize` x `ksize` window (grayscale erosion).
///
/// # Errors
///
/// Returns [`FilterError::KernelSize`] for an unsupported kernel size.
pub fn min(image: &CanonicalImage, ksize: u32) -> Result<CanonicalImage, FilterError> {
    let mask = square(kernel_size(ksize)?)?;
    Ok(channels::map(image, |g| grayscale_erode(g, &mask)))
}

/// Maximum over a `ksize` x `ksize` window (grayscale dilation).
///
/// # Errors
///
/// Returns [`FilterError::KernelSize`] for an unsupported kernel size.
pub fn max(image: &CanonicalImage, ksize: u32) -> Result<CanonicalImage, FilterError> {
    let mask = square(kernel_size(ksize)?)?;
    Ok(channels::map(image, |g| grayscale_dilate(g, &mask)))
}

/// Square structuring element for an odd kernel size. Pixels of the
/// window that fall outside the image are ignored.
fn square(k: u32) -> Result<Mask, FilterError> {
    u8::try_from(k / 2)
        .map(Mask::square)
        .map_err(|_| FilterError::KernelSize {
            got: k,
            min: MIN_KERNEL,
            max: MAX_KERNEL,
        })
}

//! Coercing arbitrary pixel buffers into the canonical representation.
//!
//! Filters are free to return whatever pixel data is convenient (a gray
//! edge map, a floating-point intermediate, a 16-bit buffer). The session
//! normalizes every transform output with [`canonicalize`] before it is
//! shown or fed to the next transform, so the rest of the engine only
//! ever deals with [`CanonicalImage`].

use image::{DynamicImage, GrayImage, RgbImage};

use crate::types::{CanonicalImage, SessionError};

/// Sample storage of a [`PixelBuffer`], row-major and channel-interleaved.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// 8-bit integer samples.
    U8(Vec<u8>),
    /// 16-bit integer samples.
    U16(Vec<u16>),
    /// Signed 32-bit integer samples (e.g. unclamped gradient output).
    I32(Vec<i32>),
    /// Single-precision samples, nominally in `[0, 1]`.
    F32(Vec<f32>),
    /// Double-precision samples, nominally in `[0, 1]`.
    F64(Vec<f64>),
}

impl Samples {
    /// Number of samples stored.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    /// Returns `true` if no samples are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert every sample to 8-bit depth.
    ///
    /// Floating-point samples are rescaled from `[0, 1]` to `[0, 255]`,
    /// clipped, and truncated (NaN becomes 0). Integer samples keep their
    /// low byte, matching a plain numeric cast.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn into_u8(self) -> Vec<u8> {
        match self {
            Self::U8(v) => v,
            Self::U16(v) => v.into_iter().map(|s| s as u8).collect(),
            Self::I32(v) => v.into_iter().map(|s| s as u8).collect(),
            Self::F32(v) => v
                .into_iter()
                .map(|s| (s * 255.0).clamp(0.0, 255.0) as u8)
                .collect(),
            Self::F64(v) => v
                .into_iter()
                .map(|s| (s * 255.0).clamp(0.0, 255.0) as u8)
                .collect(),
        }
    }
}

/// An array-like pixel buffer of arbitrary depth and channel count.
///
/// `channels == None` models a two-dimensional array (one implicit
/// channel); `Some(n)` models a three-dimensional array with `n` samples
/// per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Samples per pixel, or `None` for a 2-D array.
    pub channels: Option<u32>,
    /// Interleaved samples, `width * height * channels` long.
    pub samples: Samples,
}

impl PixelBuffer {
    /// Create a pixel buffer from its parts.
    #[must_use]
    pub const fn new(width: u32, height: u32, channels: Option<u32>, samples: Samples) -> Self {
        Self {
            width,
            height,
            channels,
            samples,
        }
    }

    /// Samples per pixel, treating a 2-D array as one channel.
    #[must_use]
    pub fn channel_count(&self) -> u32 {
        self.channels.unwrap_or(1)
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, Some(3), Samples::U8(image.into_raw()))
    }
}

impl From<GrayImage> for PixelBuffer {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, None, Samples::U8(image.into_raw()))
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let channels = Some(u32::from(image.color().channel_count()));
        let samples = match image {
            DynamicImage::ImageLuma16(i) => Samples::U16(i.into_raw()),
            DynamicImage::ImageLumaA16(i) => Samples::U16(i.into_raw()),
            DynamicImage::ImageRgb16(i) => Samples::U16(i.into_raw()),
            DynamicImage::ImageRgba16(i) => Samples::U16(i.into_raw()),
            DynamicImage::ImageRgb32F(i) => Samples::F32(i.into_raw()),
            DynamicImage::ImageRgba32F(i) => Samples::F32(i.into_raw()),
            other => Samples::U8(other.into_bytes()),
        };
        Self::new(width, height, channels, samples)
    }
}

/// Normalize a pixel buffer to a 3-channel, 8-bit [`CanonicalImage`].
///
/// Single-channel input (2-D, or 3-D with one channel) is broadcast to
/// three channels; 3-channel input passes through.
///
/// # Errors
///
/// Returns [`SessionError::InvalidImage`] if the buffer has no pixels or
/// its sample count does not match its shape.
/// Returns [`SessionError::UnsupportedShape`] for any channel count other
/// than one or three.
pub fn canonicalize(buffer: impl Into<PixelBuffer>) -> Result<CanonicalImage, SessionError> {
    let buffer = buffer.into();
    if buffer.width == 0 || buffer.height == 0 || buffer.samples.is_empty() {
        return Err(SessionError::InvalidImage(format!(
            "image is empty ({}x{}, {} samples)",
            buffer.width,
            buffer.height,
            buffer.samples.len(),
        )));
    }

    let channels = buffer.channel_count();
    if channels != 1 && channels != 3 {
        return Err(SessionError::UnsupportedShape { channels });
    }

    let expected = u64::from(buffer.width) * u64::from(buffer.height) * u64::from(channels);
    let actual = buffer.samples.len() as u64;
    if expected != actual {
        return Err(SessionError::InvalidImage(format!(
            "{}x{}x{channels} image needs {expected} samples, got {actual}",
            buffer.width, buffer.height,
        )));
    }

    let (width, height) = (buffer.width, buffer.height);
    let bytes = buffer.samples.into_u8();
    let rgb = if channels == 1 {
        bytes.iter().flat_map(|&v| [v, v, v]).collect()
    } else {
        bytes
    };

    RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
        SessionError::InvalidImage(format!("{width}x{height} buffer does not fit its samples"))
    })
}

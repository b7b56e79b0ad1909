//! [`FilterKind`]: every library filter with its parameters bound.

use std::fmt;

use serde::{Deserialize, Serialize};
use tinct_session::{CanonicalImage, PixelBuffer, Transform, transform};

use crate::error::FilterError;
use crate::{noise, sharp, smooth};

const fn default_probability() -> f64 {
    noise::DEFAULT_PROBABILITY
}

const fn default_mixed_pepper() -> f64 {
    noise::DEFAULT_MIXED_PEPPER
}

const fn default_kernel() -> u32 {
    smooth::DEFAULT_KERNEL
}

/// A library filter and its parameters.
///
/// Serialized with an internal `kind` tag, e.g.
/// `{"kind": "median", "ksize": 5}` or `{"kind": "sobel"}`. Omitted
/// parameters take the stock defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    /// White impulse noise.
    Salt {
        /// Per-sample probability.
        #[serde(default = "default_probability")]
        probability: f64,
        /// Noise seed.
        #[serde(default)]
        seed: u64,
    },
    /// Black impulse noise.
    Pepper {
        /// Per-sample probability.
        #[serde(default = "default_probability")]
        probability: f64,
        /// Noise seed.
        #[serde(default)]
        seed: u64,
    },
    /// White and black impulse noise.
    SaltAndPepper {
        /// Per-sample salt probability.
        #[serde(default = "default_probability")]
        salt: f64,
        /// Per-sample pepper probability.
        #[serde(default = "default_mixed_pepper")]
        pepper: f64,
        /// Noise seed.
        #[serde(default)]
        seed: u64,
    },
    /// Gaussian blur.
    Gaussian {
        /// Kernel size.
        #[serde(default = "default_kernel")]
        ksize: u32,
    },
    /// Box blur.
    Mean {
        /// Kernel size.
        #[serde(default = "default_kernel")]
        ksize: u32,
    },
    /// Median filter.
    Median {
        /// Kernel size.
        #[serde(default = "default_kernel")]
        ksize: u32,
    },
    /// Minimum filter (erosion).
    Min {
        /// Kernel size.
        #[serde(default = "default_kernel")]
        ksize: u32,
    },
    /// Maximum filter (dilation).
    Max {
        /// Kernel size.
        #[serde(default = "default_kernel")]
        ksize: u32,
    },
    /// Laplacian sharpening.
    Laplacian,
    /// Sobel edge boost.
    Sobel,
    /// Prewitt edge boost.
    Prewitt,
}

impl FilterKind {
    /// Check the parameters without running the filter.
    ///
    /// # Errors
    ///
    /// Returns the [`FilterError`] the filter would fail with.
    pub fn validate(&self) -> Result<(), FilterError> {
        match *self {
            Self::Salt { probability, .. } => noise::check_probability("salt", probability),
            Self::Pepper { probability, .. } => noise::check_probability("pepper", probability),
            Self::SaltAndPepper { salt, pepper, .. } => {
                noise::check_probability("salt", salt)?;
                noise::check_probability("pepper", pepper)
            }
            Self::Gaussian { ksize }
            | Self::Mean { ksize }
            | Self::Median { ksize }
            | Self::Min { ksize }
            | Self::Max { ksize } => smooth::kernel_size(ksize).map(|_| ()),
            Self::Laplacian | Self::Sobel | Self::Prewitt => Ok(()),
        }
    }

    /// Run the filter on `image`.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] for invalid parameters.
    pub fn apply(&self, image: &CanonicalImage) -> Result<CanonicalImage, FilterError> {
        match *self {
            Self::Salt { probability, seed } => noise::salt(image, probability, seed),
            Self::Pepper { probability, seed } => noise::pepper(image, probability, seed),
            Self::SaltAndPepper { salt, pepper, seed } => {
                noise::salt_and_pepper(image, salt, pepper, seed)
            }
            Self::Gaussian { ksize } => smooth::gaussian(image, ksize),
            Self::Mean { ksize } => smooth::mean(image, ksize),
            Self::Median { ksize } => smooth::median(image, ksize),
            Self::Min { ksize } => smooth::min(image, ksize),
            Self::Max { ksize } => smooth::max(image, ksize),
            Self::Laplacian => Ok(sharp::laplacian(image)),
            Self::Sobel => Ok(sharp::sobel(image)),
            Self::Prewitt => Ok(sharp::prewitt(image)),
        }
    }

    /// Validate the parameters and wrap the filter as a session
    /// [`Transform`].
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] for invalid parameters, so a bad filter
    /// is rejected before a session is built.
    pub fn into_transform(self) -> Result<Transform, FilterError> {
        self.validate()?;
        Ok(transform(move |image: CanonicalImage| {
            let out = self.apply(&image)?;
            Ok(PixelBuffer::from(out))
        }))
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Salt { probability, .. } => write!(f, "salt ({probability})"),
            Self::Pepper { probability, .. } => write!(f, "pepper ({probability})"),
            Self::SaltAndPepper { salt, pepper, .. } => {
                write!(f, "salt and pepper ({salt}/{pepper})")
            }
            Self::Gaussian { ksize } => write!(f, "gaussian {ksize}x{ksize}"),
            Self::Mean { ksize } => write!(f, "mean {ksize}x{ksize}"),
            Self::Median { ksize } => write!(f, "median {ksize}x{ksize}"),
            Self::Min { ksize } => write!(f, "min {ksize}x{ksize}"),
            Self::Max { ksize } => write!(f, "max {ksize}x{ksize}"),
            Self::Laplacian => f.write_str("laplacian"),
            Self::Sobel => f.write_str("sobel"),
            Self::Prewitt => f.write_str("prewitt"),
        }
    }
}

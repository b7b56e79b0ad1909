//! Impulse noise: salt, pepper, and both.
//!
//! Each sample (one channel of one pixel) is hit independently with the
//! given probability. Salt sets a hit sample to 255, pepper to 0.
//!
//! The per-sample draw is a SipHash of the sample coordinates and the
//! noise role, keyed by the seed and a digest of the input image. A noise
//! filter is therefore a pure function of its input, yet applying it again
//! to its own output hits a fresh set of samples, so repeated selections
//! compound.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;
use tinct_session::CanonicalImage;

use crate::error::FilterError;

/// Probability used by the stock noise menu.
pub const DEFAULT_PROBABILITY: f64 = 0.15;

/// Pepper probability of the stock salt-and-pepper filter; its salt
/// probability is [`DEFAULT_PROBABILITY`].
pub const DEFAULT_MIXED_PEPPER: f64 = 0.01;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0;

/// Second SipHash key for the image digest.
const KEY1: u64 = 0x7469_6e63_745f_6e7a;

#[derive(Debug, Clone, Copy)]
enum Role {
    Salt,
    Pepper,
}

impl Role {
    const fn name(self) -> &'static str {
        match self {
            Self::Salt => "salt",
            Self::Pepper => "pepper",
        }
    }

    const fn value(self) -> u8 {
        match self {
            Self::Salt => 255,
            Self::Pepper => 0,
        }
    }
}

/// Check that `probability` is a usable noise probability.
///
/// # Errors
///
/// Returns [`FilterError::Probability`] for values outside `[0, 1]` and
/// for NaN.
pub fn check_probability(which: &'static str, probability: f64) -> Result<(), FilterError> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        Err(FilterError::Probability {
            which,
            got: probability,
        })
    }
}

/// Draw keys for one pass over `image`: the seed and a digest of the
/// image's dimensions and samples.
fn keys(image: &CanonicalImage, seed: u64) -> (u64, u64) {
    let mut hasher = SipHasher13::new_with_keys(seed, KEY1);
    hasher.write_u32(image.width());
    hasher.write_u32(image.height());
    hasher.write(image.as_raw());
    (seed, hasher.finish())
}

/// Uniform draw in `[0, 1)` for one sample.
#[allow(clippy::cast_precision_loss)]
fn draw((key0, key1): (u64, u64), x: u32, y: u32, channel: usize, role: Role) -> f64 {
    let mut hasher = SipHasher13::new_with_keys(key0, key1);
    hasher.write_u32(x);
    hasher.write_u32(y);
    hasher.write_usize(channel);
    hasher.write_u8(role as u8);
    // Top 53 bits fill an f64 mantissa exactly.
    (hasher.finish() >> 11) as f64 / (1_u64 << 53) as f64
}

fn scatter(image: &mut CanonicalImage, probability: f64, keys: (u64, u64), role: Role) {
    if probability <= 0.0 {
        return;
    }
    let value = role.value();
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        for (channel, sample) in pixel.0.iter_mut().enumerate() {
            if draw(keys, x, y, channel, role) < probability {
                *sample = value;
            }
        }
    }
}

/// Set each sample to white with probability `probability`.
///
/// # Errors
///
/// Returns [`FilterError::Probability`] if `probability` is not within
/// `[0, 1]`.
pub fn salt(image: &CanonicalImage, probability: f64, seed: u64) -> Result<CanonicalImage, FilterError> {
    check_probability(Role::Salt.name(), probability)?;
    let mut out = image.clone();
    scatter(&mut out, probability, keys(image, seed), Role::Salt);
    Ok(out)
}

/// Set each sample to black with probability `probability`.
///
/// # Errors
///
/// Returns [`FilterError::Probability`] if `probability` is not within
/// `[0, 1]`.
pub fn pepper(image: &CanonicalImage, probability: f64, seed: u64) -> Result<CanonicalImage, FilterError> {
    check_probability(Role::Pepper.name(), probability)?;
    let mut out = image.clone();
    scatter(&mut out, probability, keys(image, seed), Role::Pepper);
    Ok(out)
}

/// Salt, then pepper, with independent draws keyed on the input image.
///
/// A sample hit by both ends up black.
///
/// # Errors
///
/// Returns [`FilterError::Probability`] if either probability is not
/// within `[0, 1]`.
pub fn salt_and_pepper(
    image: &CanonicalImage,
    salt_probability: f64,
    pepper_probability: f64,
    seed: u64,
) -> Result<CanonicalImage, FilterError> {
    check_probability(Role::Salt.name(), salt_probability)?;
    check_probability(Role::Pepper.name(), pepper_probability)?;
    let pass = keys(image, seed);
    let mut out = image.clone();
    scatter(&mut out, salt_probability, pass, Role::Salt);
    scatter(&mut out, pepper_probability, pass, Role::Pepper);
    Ok(out)
}

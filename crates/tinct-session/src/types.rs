//! Shared types for tinct filter sessions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::downsample::DownsampleFilter;

/// Re-export `RgbImage` as the canonical image representation.
///
/// Every transform receives a `CanonicalImage` and every transform output
/// is normalized back into one: a dense grid of 8-bit R, G, B pixels.
pub type CanonicalImage = image::RgbImage;

/// Error type a filter transform may fail with.
///
/// Boxed so filter implementations can propagate any error with `?`.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// Bounding box for the downscaled display copy, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    /// Maximum width in pixels.
    pub width: u32,
    /// Maximum height in pixels.
    pub height: u32,
}

impl DisplaySize {
    /// Create a new bounding box.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for DisplaySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Options for a single filter session.
///
/// `title` is presentation-only; the session core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Bounding box for the preview copy. The copy preserves aspect
    /// ratio and is never upscaled.
    pub display_max_size: DisplaySize,

    /// When `true`, each selection composes with the prior selections.
    /// When `false`, each selection replaces them.
    pub cumulative: bool,

    /// Display label for the presenter.
    pub title: String,

    /// Resampling filter used to build the display copy.
    pub downsample_filter: DownsampleFilter,
}

impl SessionOptions {
    /// Default preview bounding box.
    pub const DEFAULT_DISPLAY_MAX_SIZE: DisplaySize = DisplaySize::new(640, 480);

    /// Default selection mode.
    pub const DEFAULT_CUMULATIVE: bool = true;

    /// Default presenter title.
    pub const DEFAULT_TITLE: &'static str = "Filters";

    /// Check the options for values no session can work with.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if either side of the
    /// display bounding box is zero.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.display_max_size.width == 0 || self.display_max_size.height == 0 {
            return Err(SessionError::InvalidConfig(format!(
                "display_max_size must be non-zero, got {}",
                self.display_max_size,
            )));
        }
        Ok(())
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            display_max_size: Self::DEFAULT_DISPLAY_MAX_SIZE,
            cumulative: Self::DEFAULT_CUMULATIVE,
            title: Self::DEFAULT_TITLE.to_string(),
            downsample_filter: DownsampleFilter::default(),
        }
    }
}

/// Terminal outcome of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The full chain was replayed and a result is available.
    Applied,
    /// The user cancelled; no result.
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Accepting intents.
    #[default]
    Idle,
    /// Terminal: the session reached an outcome.
    Finished(Outcome),
}

impl SessionState {
    /// Returns `true` once an outcome has been reached.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Errors produced while building or driving a filter session.
///
/// Construction errors (`InvalidDescriptor`, `UnsupportedShape`,
/// `InvalidConfig`, `InvalidImage`) abort session creation. The rest are
/// reported for a single intent and leave the session usable; see
/// [`is_recoverable`](Self::is_recoverable).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A filter descriptor is missing its name or full transform.
    #[error("invalid filter descriptor: {0}")]
    InvalidDescriptor(String),

    /// The pixel buffer has a channel count that cannot be made RGB.
    #[error("unsupported image shape: {channels} channels")]
    UnsupportedShape {
        /// Channel count of the rejected buffer.
        channels: u32,
    },

    /// Session options are invalid.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// The source image is empty or its samples do not match its shape.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// A selection referred to a filter that does not exist.
    #[error("no filter at index {index} (session has {count} filters)")]
    UnknownFilter {
        /// Requested filter index.
        index: usize,
        /// Number of filters in the session.
        count: usize,
    },

    /// A preview transform failed; the preview and chains are unchanged.
    #[error("preview of filter '{name}' failed: {source}")]
    PreviewFailed {
        /// Name of the filter that failed.
        name: String,
        /// Underlying transform error.
        #[source]
        source: TransformError,
    },

    /// A full-resolution transform failed during apply; no result was
    /// produced and the chains are unchanged.
    #[error("applying filters to full image failed at step {step} ('{name}'): {source}")]
    ApplyFailed {
        /// Zero-based position of the failing step in the chain.
        step: usize,
        /// Name of the filter that failed.
        name: String,
        /// Underlying transform error.
        #[source]
        source: TransformError,
    },

    /// The session already reached a terminal state.
    #[error("session already {0}")]
    Finished(Outcome),
}

impl SessionError {
    /// Returns `true` for errors that leave the session usable.
    ///
    /// The presenter surfaces these to the user and keeps accepting
    /// intents.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownFilter { .. } | Self::PreviewFailed { .. } | Self::ApplyFailed { .. }
        )
    }

    /// Returns `true` for errors raised while constructing a session.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidDescriptor(_) | Self::UnsupportedShape { .. } | Self::InvalidConfig(_)
        )
    }
}

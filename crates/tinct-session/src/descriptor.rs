//! Filter descriptors and their normalization into [`FilterSpec`].
//!
//! Callers describe filters in whichever shape is convenient: a name with
//! one transform, a name with separate full and preview transforms, or a
//! keyed record whose fields may be absent. [`normalize_descriptors`]
//! turns all of them into the single [`FilterSpec`] shape the session
//! works with, once, before the session starts.

use std::fmt;
use std::sync::Arc;

use crate::canonical::PixelBuffer;
use crate::types::{CanonicalImage, SessionError, TransformError};

/// A filter transform: takes an owned copy of the canonical image and
/// returns a pixel buffer that the session re-normalizes.
pub type Transform =
    Arc<dyn Fn(CanonicalImage) -> Result<PixelBuffer, TransformError> + Send + Sync>;

/// Wrap a closure as a [`Transform`].
pub fn transform<F>(f: F) -> Transform
where
    F: Fn(CanonicalImage) -> Result<PixelBuffer, TransformError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A normalized filter: a name plus full-resolution and preview
/// transforms.
///
/// The preview transform is a cheaper approximation used on the
/// downscaled display copy. It is the full transform itself when none was
/// supplied.
#[derive(Clone)]
pub struct FilterSpec {
    name: String,
    full: Transform,
    preview: Transform,
}

impl FilterSpec {
    /// Filter name, as shown in the presenter's menu.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform replayed against the full-resolution original on apply.
    #[must_use]
    pub const fn full(&self) -> &Transform {
        &self.full
    }

    /// Transform run against the display copy on select.
    #[must_use]
    pub const fn preview(&self) -> &Transform {
        &self.preview
    }

    /// Returns `true` when the preview transform is the full transform.
    #[must_use]
    pub fn shares_preview(&self) -> bool {
        Arc::ptr_eq(&self.full, &self.preview)
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("name", &self.name)
            .field("shares_preview", &self.shares_preview())
            .finish_non_exhaustive()
    }
}

/// One filter as supplied by the caller.
pub enum FilterDescriptor {
    /// `(name, transform)`: the transform serves both full and preview.
    Single {
        /// Filter name.
        name: String,
        /// Transform used for both full and preview.
        transform: Transform,
    },
    /// `(name, full, preview)`.
    Split {
        /// Filter name.
        name: String,
        /// Full-resolution transform.
        full: Transform,
        /// Preview transform.
        preview: Transform,
    },
    /// A keyed record; `name` and `full` are required, `preview` is
    /// optional.
    Keyed {
        /// Filter name.
        name: Option<String>,
        /// Full-resolution transform.
        full: Option<Transform>,
        /// Preview transform; defaults to `full`.
        preview: Option<Transform>,
    },
}

impl fmt::Debug for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { name, .. } => f
                .debug_struct("Single")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::Split { name, .. } => f
                .debug_struct("Split")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::Keyed {
                name,
                full,
                preview,
            } => f
                .debug_struct("Keyed")
                .field("name", name)
                .field("has_full", &full.is_some())
                .field("has_preview", &preview.is_some())
                .finish(),
        }
    }
}

impl<S, F> From<(S, F)> for FilterDescriptor
where
    S: Into<String>,
    F: Fn(CanonicalImage) -> Result<PixelBuffer, TransformError> + Send + Sync + 'static,
{
    fn from((name, f): (S, F)) -> Self {
        Self::Single {
            name: name.into(),
            transform: Arc::new(f),
        }
    }
}

impl<S, F, G> From<(S, F, G)> for FilterDescriptor
where
    S: Into<String>,
    F: Fn(CanonicalImage) -> Result<PixelBuffer, TransformError> + Send + Sync + 'static,
    G: Fn(CanonicalImage) -> Result<PixelBuffer, TransformError> + Send + Sync + 'static,
{
    fn from((name, full, preview): (S, F, G)) -> Self {
        Self::Split {
            name: name.into(),
            full: Arc::new(full),
            preview: Arc::new(preview),
        }
    }
}

impl FilterDescriptor {
    /// Normalize this descriptor into a [`FilterSpec`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidDescriptor`] if the name is missing
    /// or blank, or a keyed record has no full transform.
    pub fn normalize(self) -> Result<FilterSpec, SessionError> {
        let (name, full, preview) = match self {
            Self::Single { name, transform } => {
                (Some(name), Some(Arc::clone(&transform)), Some(transform))
            }
            Self::Split {
                name,
                full,
                preview,
            } => (Some(name), Some(full), Some(preview)),
            Self::Keyed {
                name,
                full,
                preview,
            } => {
                let preview = preview.or_else(|| full.clone());
                (name, full, preview)
            }
        };

        let name = match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(SessionError::InvalidDescriptor(
                    "descriptor requires a non-empty 'name'".to_string(),
                ));
            }
        };
        let (Some(full), Some(preview)) = (full, preview) else {
            return Err(SessionError::InvalidDescriptor(format!(
                "descriptor '{name}' requires a 'full' transform",
            )));
        };

        Ok(FilterSpec {
            name,
            full,
            preview,
        })
    }
}

/// Normalize descriptors into filter specs, preserving input order.
///
/// The order defines presentation order only; application order is the
/// order in which filters are selected.
///
/// # Errors
///
/// Returns [`SessionError::InvalidDescriptor`] for the first invalid
/// descriptor (annotated with its position), or if there are no
/// descriptors at all.
pub fn normalize_descriptors<I>(descriptors: I) -> Result<Vec<FilterSpec>, SessionError>
where
    I: IntoIterator<Item = FilterDescriptor>,
{
    let specs = descriptors
        .into_iter()
        .enumerate()
        .map(|(i, descriptor)| {
            descriptor.normalize().map_err(|e| match e {
                SessionError::InvalidDescriptor(msg) => {
                    SessionError::InvalidDescriptor(format!("filter #{i}: {msg}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if specs.is_empty() {
        return Err(SessionError::InvalidDescriptor(
            "at least one filter is required".to_string(),
        ));
    }
    Ok(specs)
}

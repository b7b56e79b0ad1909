//! tinct-filters: Noise, smoothing and sharpening filters for tinct
//! sessions.
//!
//! Every filter is a pure function of a [`CanonicalImage`](tinct_session::CanonicalImage)
//! with its parameters bound up front. [`FilterKind`] names them all and
//! turns one into a session [`Transform`](tinct_session::Transform);
//! [`Category`] bundles the stock menus, and [`registry`] reads menus from
//! JSON.

pub mod category;
pub mod channels;
pub mod error;
pub mod kind;
pub mod noise;
pub mod registry;
pub mod sharp;
pub mod smooth;

pub use category::{Category, describe};
pub use error::{FilterError, RegistryError};
pub use kind::FilterKind;
pub use registry::{MenuEntry, load_descriptors, parse_menu};

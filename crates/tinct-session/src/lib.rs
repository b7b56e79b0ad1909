//! tinct-session: Interactive image filter sessions (sans-IO).
//!
//! A session takes one source image and a menu of named filters, lets the
//! user stack filters on a cheap downscaled preview, and on commit replays
//! the same selections at full resolution:
//!
//! normalize descriptors -> canonicalize source -> fit display copy ->
//! (select | reset)* -> apply | cancel.
//!
//! This crate has **no I/O dependencies**. It never decodes, renders or
//! writes images; a [`Presenter`] supplies user intents and displays
//! previews, and the committed image is returned in memory.
//!
//! ```
//! use tinct_session::{
//!     CanonicalImage, FilterDescriptor, Intent, PixelBuffer, ScriptedPresenter,
//!     SessionOptions, TransformError, run_filter_session,
//! };
//!
//! fn darken(mut img: CanonicalImage) -> Result<PixelBuffer, TransformError> {
//!     for p in img.pixels_mut() {
//!         p.0 = p.0.map(|c| c / 2);
//!     }
//!     Ok(img.into())
//! }
//!
//! let source = CanonicalImage::from_pixel(4, 4, image::Rgb([200, 100, 50]));
//! let mut presenter = ScriptedPresenter::new([Intent::Select(0), Intent::Apply]);
//! let result = run_filter_session(
//!     source,
//!     [FilterDescriptor::from(("Darken", darken))],
//!     SessionOptions::default(),
//!     &mut presenter,
//! )?;
//! assert_eq!(result.map(|img| img.get_pixel(0, 0).0), Some([100, 50, 25]));
//! # Ok::<(), tinct_session::SessionError>(())
//! ```

pub mod canonical;
pub mod descriptor;
pub mod downsample;
pub mod present;
pub mod session;
pub mod types;

pub use canonical::{PixelBuffer, Samples, canonicalize};
pub use descriptor::{FilterDescriptor, FilterSpec, Transform, normalize_descriptors, transform};
pub use downsample::{DownsampleFilter, fit_within, fitted_dimensions};
pub use present::{Presenter, ScriptedPresenter, run_filter_session};
pub use session::{FilterSession, Intent, Response, SessionView};
pub use types::{
    CanonicalImage, DisplaySize, Outcome, SessionError, SessionOptions, SessionState,
    TransformError,
};

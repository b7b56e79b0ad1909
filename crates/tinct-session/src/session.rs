//! The filter session: two replayable filter chains over one source image.
//!
//! A [`FilterSession`] owns the full-resolution original, a downscaled
//! display copy, and the current preview. Every selection runs the
//! filter's cheap preview transform against the display copy and records
//! the selection. Applying replays the full transforms of every recorded
//! selection, in order, against a fresh copy of the original, so nothing
//! computed for the preview ever reaches the committed result.
//!
//! The preview chain and the full chain are two views of one ordered list
//! of selections, which keeps them the same length and pairwise matched.
//!
//! Every intent computes its new state before touching the session, so a
//! failing transform leaves the preview, the chains and the result
//! exactly as they were.

use tracing::{debug, info, warn};

use crate::canonical::{PixelBuffer, canonicalize};
use crate::descriptor::{FilterDescriptor, FilterSpec, Transform, normalize_descriptors};
use crate::downsample::fit_within;
use crate::types::{CanonicalImage, Outcome, SessionError, SessionOptions, SessionState, TransformError};

/// A user action dispatched to the session by the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Apply the filter at this index (in presentation order) to the
    /// preview.
    Select(usize),
    /// Drop every selection and restore the preview to the display copy.
    Reset,
    /// Replay the full chain against the original and finish.
    Apply,
    /// Finish without a result.
    Cancel,
}

/// What a successfully dispatched intent produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response<'a> {
    /// The preview after a select or reset.
    Preview(&'a CanonicalImage),
    /// The session reached a terminal state.
    Finished(Outcome),
}

/// Everything a presenter needs to open the session's dialog.
#[derive(Debug, Clone)]
pub struct SessionView<'a> {
    /// Display label.
    pub title: &'a str,
    /// Filter names in presentation order.
    pub filter_names: Vec<&'a str>,
    /// The unchanged display copy of the original.
    pub base: &'a CanonicalImage,
    /// The current preview.
    pub preview: &'a CanonicalImage,
}

/// A single modal filtering interaction over one source image.
///
/// Built once per interaction, driven by [`Intent`]s until it reaches a
/// terminal state, then discarded. See the [module docs](self).
pub struct FilterSession {
    filters: Vec<FilterSpec>,
    options: SessionOptions,
    base_full: CanonicalImage,
    base_display: CanonicalImage,
    preview_display: CanonicalImage,
    /// Selected filter indices, in selection order.
    chain: Vec<usize>,
    result: Option<CanonicalImage>,
    state: SessionState,
}

impl FilterSession {
    /// Build a session from a source image and filter descriptors.
    ///
    /// The source is normalized to a [`CanonicalImage`] and a display copy
    /// is fitted into `options.display_max_size`. The preview starts as a
    /// copy of the display copy, with empty chains.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] for invalid options,
    /// [`SessionError::InvalidDescriptor`] for a bad or empty descriptor
    /// list, [`SessionError::UnsupportedShape`] or
    /// [`SessionError::InvalidImage`] for a source that cannot be
    /// normalized.
    pub fn new<I>(
        original: impl Into<PixelBuffer>,
        descriptors: I,
        options: SessionOptions,
    ) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = FilterDescriptor>,
    {
        options.validate()?;
        let filters = normalize_descriptors(descriptors)?;
        let base_full = canonicalize(original)?;
        let (base_display, resampled) =
            fit_within(&base_full, options.display_max_size, options.downsample_filter);

        debug!(
            title = %options.title,
            filters = filters.len(),
            cumulative = options.cumulative,
            full = ?base_full.dimensions(),
            display = ?base_display.dimensions(),
            resampled,
            "filter session created"
        );

        Ok(Self {
            filters,
            preview_display: base_display.clone(),
            options,
            base_full,
            base_display,
            chain: Vec::new(),
            result: None,
            state: SessionState::Idle,
        })
    }

    /// The initial view for the presenter: title, menu, base and preview.
    #[must_use]
    pub fn start(&self) -> SessionView<'_> {
        SessionView {
            title: &self.options.title,
            filter_names: self.filters.iter().map(FilterSpec::name).collect(),
            base: &self.base_display,
            preview: &self.preview_display,
        }
    }

    /// Run the preview transform of filter `index` and record the
    /// selection.
    ///
    /// In cumulative mode the transform runs against the current preview
    /// and the selection is appended to the chains. Otherwise it runs
    /// against the display copy and the chains are replaced by this single
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Finished`] on a terminal session,
    /// [`SessionError::UnknownFilter`] for an out-of-range index, and
    /// [`SessionError::PreviewFailed`] if the transform fails or returns
    /// an image that cannot be normalized. On error nothing changes.
    pub fn select(&mut self, index: usize) -> Result<&CanonicalImage, SessionError> {
        self.ensure_active()?;
        let spec = self.filters.get(index).ok_or(SessionError::UnknownFilter {
            index,
            count: self.filters.len(),
        })?;

        let input = if self.options.cumulative {
            self.preview_display.clone()
        } else {
            self.base_display.clone()
        };
        let preview = run_transform(spec.preview(), input).map_err(|source| {
            warn!(filter = spec.name(), error = %source, "preview transform failed");
            SessionError::PreviewFailed {
                name: spec.name().to_string(),
                source,
            }
        })?;
        debug!(filter = spec.name(), index, cumulative = self.options.cumulative, "filter selected");

        self.preview_display = preview;
        if !self.options.cumulative {
            self.chain.clear();
        }
        self.chain.push(index);
        Ok(&self.preview_display)
    }

    /// Drop every selection and restore the preview to the display copy.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Finished`] on a terminal session.
    pub fn reset(&mut self) -> Result<&CanonicalImage, SessionError> {
        self.ensure_active()?;
        debug!(dropped = self.chain.len(), "filter chain reset");
        self.chain.clear();
        self.preview_display = self.base_display.clone();
        Ok(&self.preview_display)
    }

    /// Replay the full chain against a copy of the original and finish.
    ///
    /// Each full transform receives the normalized output of the previous
    /// one, starting from the original. With no selections the result is
    /// a copy of the original.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Finished`] on a terminal session and
    /// [`SessionError::ApplyFailed`] if any step fails. After a failed
    /// apply the session stays active, the result stays absent and the
    /// chains are unchanged, so the caller may retry, reset or cancel.
    pub fn apply(&mut self) -> Result<Outcome, SessionError> {
        self.ensure_active()?;

        let mut image = self.base_full.clone();
        for (step, &index) in self.chain.iter().enumerate() {
            let spec = &self.filters[index];
            image = run_transform(spec.full(), image).map_err(|source| {
                warn!(step, filter = spec.name(), error = %source, "full transform failed");
                SessionError::ApplyFailed {
                    step,
                    name: spec.name().to_string(),
                    source,
                }
            })?;
        }

        info!(steps = self.chain.len(), dimensions = ?image.dimensions(), "filters applied");
        self.result = Some(image);
        self.state = SessionState::Finished(Outcome::Applied);
        Ok(Outcome::Applied)
    }

    /// Finish without a result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Finished`] on a terminal session.
    pub fn cancel(&mut self) -> Result<Outcome, SessionError> {
        self.ensure_active()?;
        info!(selections = self.chain.len(), "filter session cancelled");
        self.result = None;
        self.state = SessionState::Finished(Outcome::Cancelled);
        Ok(Outcome::Cancelled)
    }

    /// Dispatch a single intent.
    ///
    /// # Errors
    ///
    /// Returns whatever the corresponding method returns.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Response<'_>, SessionError> {
        match intent {
            Intent::Select(index) => self.select(index).map(Response::Preview),
            Intent::Reset => self.reset().map(Response::Preview),
            Intent::Apply => self.apply().map(Response::Finished),
            Intent::Cancel => self.cancel().map(Response::Finished),
        }
    }

    /// Normalized filters in presentation order.
    #[must_use]
    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    /// Index of the first filter named `name`, if any.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.filters.iter().position(|f| f.name() == name)
    }

    /// Options the session was built with.
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The normalized full-resolution original. Never modified.
    #[must_use]
    pub const fn base_full(&self) -> &CanonicalImage {
        &self.base_full
    }

    /// The downscaled display copy of the original. Never modified.
    #[must_use]
    pub const fn base_display(&self) -> &CanonicalImage {
        &self.base_display
    }

    /// The current preview.
    #[must_use]
    pub const fn preview(&self) -> &CanonicalImage {
        &self.preview_display
    }

    /// Selected filter indices in selection order.
    #[must_use]
    pub fn selections(&self) -> &[usize] {
        &self.chain
    }

    /// Names of the selected filters in selection order.
    pub fn selected_names(&self) -> impl Iterator<Item = &str> {
        self.chain.iter().map(|&i| self.filters[i].name())
    }

    /// Full transforms in selection order.
    pub fn full_chain(&self) -> impl Iterator<Item = &Transform> {
        self.chain.iter().map(|&i| self.filters[i].full())
    }

    /// Preview transforms in selection order.
    pub fn preview_chain(&self) -> impl Iterator<Item = &Transform> {
        self.chain.iter().map(|&i| self.filters[i].preview())
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The committed result; present only after a successful apply.
    #[must_use]
    pub const fn result(&self) -> Option<&CanonicalImage> {
        self.result.as_ref()
    }

    /// Consume the session, returning the committed result if any.
    #[must_use]
    pub fn into_result(self) -> Option<CanonicalImage> {
        self.result
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Finished(outcome) => Err(SessionError::Finished(outcome)),
        }
    }
}

/// Run one transform and normalize its output.
fn run_transform(transform: &Transform, input: CanonicalImage) -> Result<CanonicalImage, TransformError> {
    let output = (**transform)(input)?;
    Ok(canonicalize(output)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::canonical::Samples;
    use crate::types::DisplaySize;

    fn gray(w: u32, h: u32, v: u8) -> CanonicalImage {
        CanonicalImage::from_pixel(w, h, image::Rgb([v, v, v]))
    }

    fn black(img: CanonicalImage) -> Result<PixelBuffer, TransformError> {
        Ok(gray(img.width(), img.height(), 0).into())
    }

    fn white(img: CanonicalImage) -> Result<PixelBuffer, TransformError> {
        Ok(gray(img.width(), img.height(), 255).into())
    }

    fn brighten(mut img: CanonicalImage) -> Result<PixelBuffer, TransformError> {
        for p in img.pixels_mut() {
            for c in &mut p.0 {
                *c = c.saturating_add(10);
            }
        }
        Ok(img.into())
    }

    fn failing(_: CanonicalImage) -> Result<PixelBuffer, TransformError> {
        Err("transform exploded".into())
    }

    fn rgba_output(img: CanonicalImage) -> Result<PixelBuffer, TransformError> {
        let (w, h) = img.dimensions();
        Ok(PixelBuffer::new(w, h, Some(4), Samples::U8(vec![0; (w * h * 4) as usize])))
    }

    fn descriptors() -> Vec<FilterDescriptor> {
        vec![
            FilterDescriptor::from(("Black", black)),
            FilterDescriptor::from(("White", white)),
            FilterDescriptor::from(("Brighten", brighten)),
            FilterDescriptor::from(("Broken", failing)),
            FilterDescriptor::from(("Broken full", failing, brighten)),
            FilterDescriptor::from(("Four channels", rgba_output)),
        ]
    }

    fn session(cumulative: bool) -> FilterSession {
        let options = SessionOptions {
            cumulative,
            ..SessionOptions::default()
        };
        FilterSession::new(gray(2, 2, 128), descriptors(), options).unwrap()
    }

    #[test]
    fn starts_idle_with_preview_equal_to_display() {
        let s = session(true);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.preview(), s.base_display());
        assert!(s.selections().is_empty());
        assert!(s.result().is_none());

        let view = s.start();
        assert_eq!(view.title, "Filters");
        assert_eq!(view.filter_names[..3], ["Black", "White", "Brighten"]);
        assert_eq!(view.base, view.preview);
    }

    #[test]
    fn cumulative_select_stacks() {
        let mut s = session(true);
        s.select(0).unwrap();
        let preview = s.select(2).unwrap();
        assert_eq!(*preview, gray(2, 2, 10));
        assert_eq!(s.selections(), [0, 2]);
        assert_eq!(s.full_chain().count(), 2);
        assert_eq!(s.preview_chain().count(), 2);
    }

    #[test]
    fn non_cumulative_select_replaces() {
        let mut s = session(false);
        s.select(0).unwrap();
        let preview = s.select(2).unwrap();
        assert_eq!(*preview, gray(2, 2, 138));
        assert_eq!(s.selections(), [2]);
    }

    #[test]
    fn failed_preview_rolls_back() {
        let mut s = session(true);
        s.select(2).unwrap();
        let before_preview = s.preview().clone();
        let before_chain = s.selections().to_vec();

        let err = s.select(3).unwrap_err();
        assert!(matches!(err, SessionError::PreviewFailed { ref name, .. } if name == "Broken"));
        assert!(err.is_recoverable());
        assert_eq!(*s.preview(), before_preview);
        assert_eq!(s.selections(), before_chain);
        assert_eq!(s.state(), SessionState::Idle);

        // Still usable.
        s.select(2).unwrap();
        assert_eq!(s.selections(), [2, 2]);
    }

    #[test]
    fn unnormalizable_preview_output_is_a_preview_failure() {
        let mut s = session(true);
        let err = s.select(5).unwrap_err();
        assert!(matches!(err, SessionError::PreviewFailed { .. }));
        assert!(s.selections().is_empty());
    }

    #[test]
    fn unknown_index_changes_nothing() {
        let mut s = session(true);
        let err = s.select(42).unwrap_err();
        assert!(matches!(err, SessionError::UnknownFilter { index: 42, count: 6 }));
        assert_eq!(s.preview(), s.base_display());
    }

    #[test]
    fn reset_restores_display_copy() {
        let mut s = session(true);
        s.select(0).unwrap();
        s.select(2).unwrap();
        let preview = s.reset().unwrap().clone();
        assert_eq!(preview, *s.base_display());
        assert!(s.selections().is_empty());
        assert_eq!(s.full_chain().count(), 0);
    }

    #[test]
    fn apply_replays_full_chain_on_original() {
        let mut s = session(true);
        s.select(2).unwrap();
        s.select(2).unwrap();
        assert_eq!(s.apply().unwrap(), Outcome::Applied);
        assert_eq!(s.state(), SessionState::Finished(Outcome::Applied));
        assert_eq!(*s.result().unwrap(), gray(2, 2, 148));
        assert_eq!(*s.base_full(), gray(2, 2, 128));
    }

    #[test]
    fn apply_with_empty_chain_commits_original() {
        let mut s = session(true);
        s.apply().unwrap();
        assert_eq!(s.into_result().unwrap(), gray(2, 2, 128));
    }

    #[test]
    fn failed_apply_keeps_session_active() {
        let mut s = session(true);
        s.select(2).unwrap();
        s.select(4).unwrap();
        let err = s.apply().unwrap_err();
        assert!(matches!(
            err,
            SessionError::ApplyFailed { step: 1, ref name, .. } if name == "Broken full"
        ));
        assert!(s.result().is_none());
        assert_eq!(s.selections(), [2, 4]);
        assert_eq!(s.state(), SessionState::Idle);

        s.reset().unwrap();
        s.select(2).unwrap();
        s.apply().unwrap();
        assert_eq!(*s.result().unwrap(), gray(2, 2, 138));
    }

    #[test]
    fn cancel_yields_no_result_and_terminates() {
        let mut s = session(true);
        s.select(1).unwrap();
        assert_eq!(s.cancel().unwrap(), Outcome::Cancelled);
        assert!(s.result().is_none());
        assert!(matches!(
            s.select(0),
            Err(SessionError::Finished(Outcome::Cancelled))
        ));
        assert!(matches!(s.apply(), Err(SessionError::Finished(Outcome::Cancelled))));
        assert!(matches!(s.reset(), Err(SessionError::Finished(Outcome::Cancelled))));
        assert!(matches!(s.cancel(), Err(SessionError::Finished(Outcome::Cancelled))));
    }

    #[test]
    fn applied_session_rejects_intents() {
        let mut s = session(true);
        s.apply().unwrap();
        assert!(matches!(
            s.dispatch(Intent::Cancel),
            Err(SessionError::Finished(Outcome::Applied))
        ));
        assert!(s.result().is_some());
    }

    #[test]
    fn dispatch_maps_intents() {
        let mut s = session(true);
        assert!(matches!(s.dispatch(Intent::Select(1)), Ok(Response::Preview(p)) if *p == gray(2, 2, 255)));
        assert!(matches!(s.dispatch(Intent::Reset), Ok(Response::Preview(_))));
        assert!(matches!(
            s.dispatch(Intent::Apply),
            Ok(Response::Finished(Outcome::Applied))
        ));
    }

    #[test]
    fn display_copy_is_fitted() {
        let options = SessionOptions {
            display_max_size: DisplaySize::new(10, 10),
            ..SessionOptions::default()
        };
        let s = FilterSession::new(gray(40, 20, 50), descriptors(), options).unwrap();
        assert_eq!(s.base_full().dimensions(), (40, 20));
        assert_eq!(s.base_display().dimensions(), (10, 5));
    }

    #[test]
    fn construction_errors() {
        let empty = FilterSession::new(CanonicalImage::new(0, 0), descriptors(), SessionOptions::default());
        assert!(matches!(empty, Err(SessionError::InvalidImage(_))));

        let no_filters = FilterSession::new(gray(2, 2, 0), Vec::new(), SessionOptions::default());
        assert!(matches!(no_filters, Err(SessionError::InvalidDescriptor(_))));

        let bad_options = SessionOptions {
            display_max_size: DisplaySize::new(0, 0),
            ..SessionOptions::default()
        };
        let bad = FilterSession::new(gray(2, 2, 0), descriptors(), bad_options);
        assert!(matches!(bad, Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn position_and_names() {
        let mut s = session(true);
        assert_eq!(s.position("Brighten"), Some(2));
        assert_eq!(s.position("Missing"), None);
        s.select(1).unwrap();
        s.select(0).unwrap();
        assert_eq!(s.selected_names().collect::<Vec<_>>(), ["White", "Black"]);
    }
}

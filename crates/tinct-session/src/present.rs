//! The presentation boundary: how a UI drives a [`FilterSession`].
//!
//! The session never renders anything. A [`Presenter`] shows the menu
//! and images, blocks for the next user action, and surfaces recoverable
//! errors as messages; [`FilterSession::run`] is the modal loop that
//! connects the two.

use std::collections::VecDeque;

use tracing::debug;

use crate::canonical::PixelBuffer;
use crate::descriptor::FilterDescriptor;
use crate::session::{FilterSession, Intent, Response, SessionView};
use crate::types::{CanonicalImage, Outcome, SessionError, SessionOptions};

/// A UI that can host a filter session.
pub trait Presenter {
    /// Show the dialog: title, filter menu, base and initial preview.
    fn open(&mut self, view: SessionView<'_>);

    /// Block until the user commits to an action.
    fn next_intent(&mut self) -> Intent;

    /// Show the preview produced by a select or reset.
    fn preview_changed(&mut self, preview: &CanonicalImage);

    /// Surface a recoverable error; the session keeps accepting intents.
    fn report_error(&mut self, message: &str);

    /// The session reached a terminal state and the dialog may close.
    fn close(&mut self, outcome: Outcome) {
        let _ = outcome;
    }
}

impl FilterSession {
    /// Drive the session modally until it reaches a terminal state.
    ///
    /// Returns the committed image, or `None` if the user cancelled.
    pub fn run<P: Presenter + ?Sized>(mut self, presenter: &mut P) -> Option<CanonicalImage> {
        presenter.open(self.start());
        loop {
            let intent = presenter.next_intent();
            debug!(?intent, "intent received");
            let finished = match self.dispatch(intent) {
                Ok(Response::Preview(preview)) => {
                    presenter.preview_changed(preview);
                    None
                }
                Ok(Response::Finished(outcome)) => Some(outcome),
                Err(e) => {
                    presenter.report_error(&e.to_string());
                    None
                }
            };
            if let Some(outcome) = finished {
                presenter.close(outcome);
                return self.into_result();
            }
        }
    }
}

/// Build a session and drive it with `presenter`.
///
/// # Errors
///
/// Returns the construction errors of [`FilterSession::new`]. Errors
/// raised by individual intents are reported to the presenter instead.
pub fn run_filter_session<I, P>(
    original: impl Into<PixelBuffer>,
    descriptors: I,
    options: SessionOptions,
    presenter: &mut P,
) -> Result<Option<CanonicalImage>, SessionError>
where
    I: IntoIterator<Item = FilterDescriptor>,
    P: Presenter + ?Sized,
{
    let session = FilterSession::new(original, descriptors, options)?;
    Ok(session.run(presenter))
}

/// A presenter that replays a fixed list of intents.
///
/// Once the list runs out it answers [`Intent::Cancel`], so a session
/// driven by it always terminates. Everything the session reports is
/// recorded for inspection.
#[derive(Debug, Default)]
pub struct ScriptedPresenter {
    intents: VecDeque<Intent>,
    title: Option<String>,
    filter_names: Vec<String>,
    previews: Vec<CanonicalImage>,
    errors: Vec<String>,
    outcome: Option<Outcome>,
}

impl ScriptedPresenter {
    /// Create a presenter that will answer with `intents`, in order.
    pub fn new(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self {
            intents: intents.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Title the session was opened with.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Filter menu the session was opened with.
    #[must_use]
    pub fn filter_names(&self) -> &[String] {
        &self.filter_names
    }

    /// Every preview shown, starting with the initial one.
    #[must_use]
    pub fn previews(&self) -> &[CanonicalImage] {
        &self.previews
    }

    /// Every recoverable error message reported.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Terminal outcome, once the session closed.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}

impl Presenter for ScriptedPresenter {
    fn open(&mut self, view: SessionView<'_>) {
        self.title = Some(view.title.to_string());
        self.filter_names = view.filter_names.iter().map(ToString::to_string).collect();
        self.previews.push(view.preview.clone());
    }

    fn next_intent(&mut self) -> Intent {
        self.intents.pop_front().unwrap_or(Intent::Cancel)
    }

    fn preview_changed(&mut self, preview: &CanonicalImage) {
        self.previews.push(preview.clone());
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn close(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }
}

//! Errors raised while configuring library filters.

/// A filter was configured with parameters it cannot run with.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Kernel size outside the supported range.
    #[error("kernel size must be between {min} and {max}, got {got}")]
    KernelSize {
        /// Requested kernel size.
        got: u32,
        /// Smallest accepted kernel size.
        min: u32,
        /// Largest accepted kernel size.
        max: u32,
    },

    /// Noise probability outside `[0, 1]` (or NaN).
    #[error("{which} probability must be within [0, 1], got {got}")]
    Probability {
        /// Which probability was rejected (`salt` or `pepper`).
        which: &'static str,
        /// Rejected value.
        got: f64,
    },
}

/// Errors raised while reading a JSON filter descriptor list.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The document is not valid JSON, or not a JSON array.
    #[error("filter list is not a JSON array: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry matches none of the accepted descriptor shapes.
    #[error("entry #{index}: {reason}")]
    Shape {
        /// Position of the entry in the list.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// An entry names a filter whose parameters are invalid.
    #[error("entry #{index} ('{name}'): {source}")]
    Filter {
        /// Position of the entry in the list.
        index: usize,
        /// Name of the entry.
        name: String,
        /// Parameter error.
        #[source]
        source: FilterError,
    },
}

impl From<RegistryError> for tinct_session::SessionError {
    fn from(err: RegistryError) -> Self {
        Self::InvalidDescriptor(err.to_string())
    }
}

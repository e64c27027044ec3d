//! Error types for gallery sessions.
//!
//! Index and configuration problems are reported as [`GalleryError`] and leave
//! the session untouched. Fetch failures are per identifier and travel as
//! [`FetchError`] inside the fetch state, so they never abort a session.

use thiserror::Error;

/// Errors returned by session configuration and cursor/scale operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GalleryError {
    /// Target index lies outside `[0, len)`.
    #[error("index {index} out of range for {len} items")]
    InvalidIndex { index: isize, len: usize },

    /// A session was configured without any items.
    #[error("images list cannot be empty")]
    EmptyDataSet,

    /// The identifier formatter produced an unusable identifier.
    #[error("formatter produced an invalid identifier for item {index}: {reason}")]
    FormatterError { index: usize, reason: String },

    /// Zoom scale was not a positive finite number.
    #[error("invalid zoom scale {0}")]
    InvalidScale(f32),

    /// The session was dismissed and no longer accepts moves.
    #[error("session has been dismissed")]
    Dismissed,
}

impl GalleryError {
    pub(crate) fn invalid_index(index: impl TryInto<isize>, len: usize) -> Self {
        Self::InvalidIndex {
            index: index.try_into().unwrap_or(isize::MAX),
            len,
        }
    }
}

/// A failed fetch, shared by every index that maps to the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fetch failed for {identifier}: {cause}")]
pub struct FetchError {
    pub identifier: String,
    pub cause: String,
}

impl FetchError {
    pub fn new(identifier: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            identifier: identifier.into(),
            cause: cause.to_string(),
        }
    }
}

pub type Result<T, E = GalleryError> = std::result::Result<T, E>;

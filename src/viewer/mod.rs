//! Viewer-facing state.
//!
//! This module provides:
//! - `Session` - Caller API over cursor, window cache and zoom state
//! - `ScaleTracker` - Per-index zoom scale that gates back/dismiss handling

pub mod scale;
pub mod session;

pub use scale::{ScaleTracker, DEFAULT_SCALE, MAX_SCALE, MIN_SCALE};
pub use session::{BackAction, Session, SessionBuilder};

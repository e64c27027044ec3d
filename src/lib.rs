//! Bounded-window prefetching image cache.
//!
//! A [`Session`] pages through an ordered [`DataSet`]. Images within a fixed
//! radius of the cursor are fetched through a [`FetchProvider`] and held by
//! the [`WindowCache`]; images that leave the radius are evicted and their
//! fetches cancelled.

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod scanner;
pub mod viewer;
pub mod window;

pub use config::{ProviderConfig, SessionConfig};
pub use error::{FetchError, GalleryError};
pub use fetch::{CancellationHandle, Completion, FetchProvider};
pub use models::{DataSet, FetchState};
pub use viewer::{BackAction, Session, SessionBuilder};
pub use window::{BoundaryPolicy, HotWindow, ReadyEvent, WindowCache};

//! Fetch providers for the window cache.
//!
//! This module provides:
//! - `FetchProvider` - The seam the window cache issues fetches through
//! - `CancellationHandle` - Best-effort cancellation token per fetch
//! - `ImageFileProvider` - Worker pool that decodes local image files

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::FetchError;

pub mod image_provider;

#[cfg(test)]
pub(crate) mod testing;

pub use image_provider::{DecodedImage, ImageFileProvider, ImageFileProviderBuilder, ImagePayload};

/// Called once by a provider when a fetch finishes.
///
/// May be called from any thread. The window cache's completion only posts a
/// record to its channel, so providers may also call it synchronously from
/// inside [`FetchProvider::fetch`].
pub type Completion<P> = Box<dyn FnOnce(Result<P, FetchError>) + Send + 'static>;

/// Cancellation token shared between the window cache and a provider.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Asynchronously produces a decoded payload for an identifier.
///
/// Providers that cannot cancel may ignore the returned handle; the window
/// cache discards results for entries it no longer holds.
pub trait FetchProvider {
    type Payload: Clone + Send + 'static;

    fn fetch(&self, identifier: &str, on_complete: Completion<Self::Payload>)
        -> CancellationHandle;
}

impl<F: FetchProvider + ?Sized> FetchProvider for Arc<F> {
    type Payload = F::Payload;

    fn fetch(
        &self,
        identifier: &str,
        on_complete: Completion<Self::Payload>,
    ) -> CancellationHandle {
        (**self).fetch(identifier, on_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let handle = CancellationHandle::new();
        let worker_side = handle.clone();
        assert!(!worker_side.is_cancelled());
        handle.cancel();
        assert!(worker_side.is_cancelled());
    }
}

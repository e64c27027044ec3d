//! Synchronous provider for tests: records requests, completes on demand.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{CancellationHandle, Completion, FetchProvider};
use crate::error::FetchError;

struct Request<P> {
    identifier: String,
    handle: CancellationHandle,
    completion: Option<Completion<P>>,
}

pub(crate) struct ManualProvider<P> {
    requests: Arc<Mutex<Vec<Request<P>>>>,
}

impl<P> Clone for ManualProvider<P> {
    fn clone(&self) -> Self {
        Self {
            requests: Arc::clone(&self.requests),
        }
    }
}

impl<P: Clone + Send + 'static> ManualProvider<P> {
    pub(crate) fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every identifier requested so far, in order.
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.identifier.clone())
            .collect()
    }

    pub(crate) fn request_count(&self, identifier: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.identifier == identifier)
            .count()
    }

    /// Identifiers with a fetch that has not completed and was not cancelled.
    pub(crate) fn outstanding(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.completion.is_some() && !r.handle.is_cancelled())
            .map(|r| r.identifier.clone())
            .collect()
    }

    pub(crate) fn was_cancelled(&self, identifier: &str) -> bool {
        self.requests
            .lock()
            .iter()
            .any(|r| r.identifier == identifier && r.handle.is_cancelled())
    }

    pub(crate) fn complete(&self, identifier: &str, payload: P) -> bool {
        self.finish(identifier, Ok(payload))
    }

    pub(crate) fn fail(&self, identifier: &str, cause: &str) -> bool {
        self.finish(identifier, Err(FetchError::new(identifier, cause)))
    }

    /// Completes the oldest unfinished request for `identifier`, cancelled or not.
    fn finish(&self, identifier: &str, outcome: Result<P, FetchError>) -> bool {
        let completion = self
            .requests
            .lock()
            .iter_mut()
            .find(|r| r.identifier == identifier && r.completion.is_some())
            .and_then(|r| r.completion.take());
        match completion {
            Some(done) => {
                done(outcome);
                true
            }
            None => false,
        }
    }
}

impl<P: Clone + Send + 'static> FetchProvider for ManualProvider<P> {
    type Payload = P;

    fn fetch(&self, identifier: &str, on_complete: Completion<P>) -> CancellationHandle {
        let handle = CancellationHandle::new();
        self.requests.lock().push(Request {
            identifier: identifier.to_string(),
            handle: handle.clone(),
            completion: Some(on_complete),
        });
        handle
    }
}

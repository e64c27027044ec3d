//! Window cache: keeps exactly the hot window's images fetched.
//!
//! - One entry per distinct identifier, shared by every hot index mapping to it
//! - Entries are created on entering the window and evicted on leaving it
//! - Completions are posted by providers onto a flume channel and applied on
//!   the control thread by [`WindowCache::process_completions`]
//!
//! Eviction is by window membership only; there is no recency ordering.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use flume::{Receiver, Sender};
use tracing::{debug, trace, warn};

use super::HotWindow;
use crate::error::FetchError;
use crate::fetch::{CancellationHandle, FetchProvider};
use crate::models::FetchState;

/// Delivered once per completed fetch, to every registered ready callback.
#[derive(Debug, Clone)]
pub struct ReadyEvent<P> {
    pub identifier: String,
    /// Hot indices sharing the identifier when the fetch completed.
    pub indices: Vec<usize>,
    pub outcome: Result<P, FetchError>,
}

pub type ReadyCallback<P> = Box<dyn FnMut(&ReadyEvent<P>)>;

/// Posted by a provider's completion closure.
struct Completed<P> {
    fetch_id: u64,
    identifier: String,
    outcome: Result<P, FetchError>,
}

enum EntryState<P> {
    Pending {
        fetch_id: u64,
        handle: CancellationHandle,
    },
    Ready(P),
    Failed(FetchError),
}

struct CacheEntry<P> {
    state: EntryState<P>,
    /// Number of hot indices mapped to this entry.
    refs: usize,
}

pub struct WindowCache<F: FetchProvider> {
    provider: F,
    /// Hot index -> identifier.
    slots: BTreeMap<usize, String>,
    entries: HashMap<String, CacheEntry<F::Payload>>,
    completion_tx: Sender<Completed<F::Payload>>,
    completion_rx: Receiver<Completed<F::Payload>>,
    callbacks: Vec<ReadyCallback<F::Payload>>,
    next_fetch_id: u64,
    fetches_issued: u64,
}

impl<F: FetchProvider> WindowCache<F> {
    pub fn new(provider: F) -> Self {
        let (completion_tx, completion_rx) = flume::unbounded();
        Self {
            provider,
            slots: BTreeMap::new(),
            entries: HashMap::new(),
            completion_tx,
            completion_rx,
            callbacks: Vec::new(),
            next_fetch_id: 0,
            fetches_issued: 0,
        }
    }

    pub fn provider(&self) -> &F {
        &self.provider
    }

    /// Register a callback for completed fetches.
    pub fn on_ready<C>(&mut self, callback: C)
    where
        C: FnMut(&ReadyEvent<F::Payload>) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Align held entries with `window`.
    ///
    /// `identifiers[i]` is the identifier of index `i`; indices past its end
    /// are ignored. Calling this again with the same window issues nothing.
    pub fn reconcile(&mut self, window: &HotWindow, identifiers: &[String]) {
        let before = self.fetches_issued;

        // Attach before releasing so an identifier that is both leaving and
        // entering keeps its entry.
        for index in window.indices().take_while(|i| *i < identifiers.len()) {
            if !self.slots.contains_key(&index) {
                self.acquire(index, &identifiers[index]);
            }
        }

        let stale: Vec<usize> = self
            .slots
            .keys()
            .copied()
            .filter(|i| !window.contains(*i))
            .collect();
        for index in stale {
            if let Some(identifier) = self.slots.remove(&index) {
                self.release(&identifier);
            }
        }

        trace!(
            start = window.start(),
            end = window.end(),
            issued = self.fetches_issued - before,
            entries = self.entries.len(),
            "Reconciled window"
        );
    }

    fn acquire(&mut self, index: usize, identifier: &str) {
        self.slots.insert(index, identifier.to_string());

        match self.entries.entry(identifier.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().refs += 1;
                trace!(index, identifier, "Attached to existing entry");
            }
            Entry::Vacant(vacant) => {
                let fetch_id = self.next_fetch_id;
                self.next_fetch_id += 1;
                self.fetches_issued += 1;

                let tx = self.completion_tx.clone();
                let id = identifier.to_string();
                let handle = self.provider.fetch(
                    identifier,
                    Box::new(move |outcome| {
                        // Receiver lives as long as the cache; a send error means it is gone.
                        let _ = tx.send(Completed {
                            fetch_id,
                            identifier: id,
                            outcome,
                        });
                    }),
                );

                debug!(index, identifier, fetch_id, "Issued fetch");
                vacant.insert(CacheEntry {
                    state: EntryState::Pending { fetch_id, handle },
                    refs: 1,
                });
            }
        }
    }

    fn release(&mut self, identifier: &str) {
        let Some(entry) = self.entries.get_mut(identifier) else {
            return;
        };
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs > 0 {
            return;
        }
        if let Some(entry) = self.entries.remove(identifier) {
            Self::cancel(identifier, entry);
        }
    }

    fn cancel(identifier: &str, entry: CacheEntry<F::Payload>) {
        match entry.state {
            EntryState::Pending { fetch_id, handle } => {
                handle.cancel();
                debug!(identifier, fetch_id, "Evicted entry, cancelled fetch");
            }
            _ => debug!(identifier, "Evicted entry"),
        }
    }

    /// State of `index`; `NotRequested` outside the window.
    pub fn get(&self, index: usize) -> FetchState<F::Payload> {
        let Some(entry) = self
            .slots
            .get(&index)
            .and_then(|identifier| self.entries.get(identifier))
        else {
            return FetchState::NotRequested;
        };
        match &entry.state {
            EntryState::Pending { .. } => FetchState::Pending,
            EntryState::Ready(payload) => FetchState::Ready(payload.clone()),
            EntryState::Failed(err) => FetchState::Failed(err.clone()),
        }
    }

    /// Drop the entry behind `index` so the next reconcile fetches it again.
    ///
    /// Every index sharing the identifier is detached. Returns false when
    /// `index` is not in the window.
    pub fn invalidate(&mut self, index: usize) -> bool {
        let Some(identifier) = self.slots.get(&index).cloned() else {
            return false;
        };
        self.slots.retain(|_, id| *id != identifier);
        if let Some(entry) = self.entries.remove(&identifier) {
            Self::cancel(&identifier, entry);
        }
        true
    }

    /// Evict everything, cancelling in-flight fetches.
    pub fn clear(&mut self) {
        self.slots.clear();
        for (identifier, entry) in self.entries.drain() {
            Self::cancel(&identifier, entry);
        }
    }

    /// Apply every completion posted so far. Returns how many were delivered.
    pub fn process_completions(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(done) = self.completion_rx.try_recv() {
            if self.apply(done) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Wait up to `timeout` for a completion, then apply everything pending.
    pub fn wait_completions(&mut self, timeout: Duration) -> usize {
        match self.completion_rx.recv_timeout(timeout) {
            Ok(done) => usize::from(self.apply(done)) + self.process_completions(),
            Err(_) => 0,
        }
    }

    fn apply(&mut self, done: Completed<F::Payload>) -> bool {
        let Completed {
            fetch_id,
            identifier,
            outcome,
        } = done;

        let Some(entry) = self.entries.get_mut(&identifier) else {
            trace!(identifier = %identifier, fetch_id, "Discarding completion for evicted entry");
            return false;
        };
        match entry.state {
            EntryState::Pending { fetch_id: current, .. } if current == fetch_id => {}
            _ => {
                trace!(identifier = %identifier, fetch_id, "Discarding stale completion");
                return false;
            }
        }

        entry.state = match &outcome {
            Ok(payload) => EntryState::Ready(payload.clone()),
            Err(err) => {
                warn!(identifier = %identifier, error = %err.cause, "Fetch failed");
                EntryState::Failed(err.clone())
            }
        };

        let indices = self
            .slots
            .iter()
            .filter(|(_, id)| **id == identifier)
            .map(|(index, _)| *index)
            .collect();
        let event = ReadyEvent {
            identifier,
            indices,
            outcome,
        };
        for callback in self.callbacks.iter_mut() {
            callback(&event);
        }
        true
    }

    /// Indices currently held, ascending.
    pub fn hot_indices(&self) -> Vec<usize> {
        self.slots.keys().copied().collect()
    }

    /// Distinct identifiers held.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.state, EntryState::Pending { .. }))
            .count()
    }

    /// Total fetches issued since creation.
    pub fn fetches_issued(&self) -> u64 {
        self.fetches_issued
    }
}

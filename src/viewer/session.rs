//! Gallery session: cursor, window cache and zoom state behind one API.
//!
//! A session is driven from a single control thread. Providers report back
//! through the window cache's channel, and nothing reaches caller callbacks
//! until [`Session::pump`] (or [`Session::pump_timeout`]) runs.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::scale::ScaleTracker;
use crate::config::SessionConfig;
use crate::error::{GalleryError, Result};
use crate::fetch::FetchProvider;
use crate::models::{DataSet, FetchState};
use crate::window::{BoundaryPolicy, CursorController, HotWindow, ReadyEvent, WindowCache};

type ImageChangeCallback = Box<dyn FnMut(usize)>;
type DismissCallback = Box<dyn FnMut()>;

/// Outcome of a back press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// The current image was zoomed; its scale was reset and the session stays open.
    ResetScale,
    Dismissed,
    /// The session was already dismissed.
    Ignored,
}

/// Builder for [`Session`].
pub struct SessionBuilder<T> {
    data: Arc<DataSet<T>>,
    config: SessionConfig,
    image_change: Vec<ImageChangeCallback>,
    dismiss: Vec<DismissCallback>,
}

impl<T> SessionBuilder<T> {
    pub fn new(data: impl Into<Arc<DataSet<T>>>) -> Self {
        Self {
            data: data.into(),
            config: SessionConfig::default(),
            image_change: Vec::new(),
            dismiss: Vec::new(),
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn start_index(mut self, index: usize) -> Self {
        self.config.start_index = index;
        self
    }

    pub fn radius(mut self, radius: usize) -> Self {
        self.config.radius = radius;
        self
    }

    pub fn boundary(mut self, policy: BoundaryPolicy) -> Self {
        self.config.boundary = policy;
        self
    }

    pub fn zoom_allowed(mut self, value: bool) -> Self {
        self.config.zoom_allowed = value;
        self
    }

    pub fn swipe_to_dismiss_allowed(mut self, value: bool) -> Self {
        self.config.swipe_to_dismiss_allowed = value;
        self
    }

    pub fn on_image_change<C: FnMut(usize) + 'static>(mut self, callback: C) -> Self {
        self.image_change.push(Box::new(callback));
        self
    }

    pub fn on_dismiss<C: FnMut() + 'static>(mut self, callback: C) -> Self {
        self.dismiss.push(Box::new(callback));
        self
    }

    /// Validate the configuration and prefetch the initial window.
    pub fn build<F: FetchProvider>(self, provider: F) -> Result<Session<T, F>> {
        if self.data.is_empty() {
            warn!("Images list cannot be empty! Viewer ignored.");
            return Err(GalleryError::EmptyDataSet);
        }
        let identifiers = self.data.identifiers()?;
        let cursor = CursorController::new(
            self.config.start_index,
            self.config.radius,
            self.data.len(),
            self.config.boundary,
        )?;

        let mut cache = WindowCache::new(provider);
        cache.reconcile(&cursor.hot_window(), &identifiers);

        info!(
            items = self.data.len(),
            start = cursor.position(),
            radius = cursor.radius(),
            boundary = %cursor.policy(),
            "Opened gallery session"
        );

        Ok(Session {
            scales: ScaleTracker::new(self.data.len(), self.config.zoom_allowed),
            data: self.data,
            identifiers,
            cursor,
            cache,
            swipe_to_dismiss_allowed: self.config.swipe_to_dismiss_allowed,
            showing: true,
            image_change: self.image_change,
            dismiss: self.dismiss,
        })
    }
}

pub struct Session<T, F: FetchProvider> {
    data: Arc<DataSet<T>>,
    /// Formatted once at configuration.
    identifiers: Vec<String>,
    cursor: CursorController,
    cache: WindowCache<F>,
    scales: ScaleTracker,
    swipe_to_dismiss_allowed: bool,
    showing: bool,
    image_change: Vec<ImageChangeCallback>,
    dismiss: Vec<DismissCallback>,
}

impl<T, F: FetchProvider> Session<T, F> {
    /// Shorthand for a builder with a start index and radius.
    pub fn configure(
        data: impl Into<Arc<DataSet<T>>>,
        start_index: usize,
        radius: usize,
        provider: F,
    ) -> Result<Self> {
        SessionBuilder::new(data)
            .start_index(start_index)
            .radius(radius)
            .build(provider)
    }

    /// Jump to `index`. Returns whether the cursor moved.
    pub fn move_to(&mut self, index: usize) -> Result<bool> {
        self.ensure_showing()?;
        let changed = self.cursor.jump_to(index)?;
        self.after_move(changed);
        Ok(changed)
    }

    /// Step by `delta` under the boundary policy. Returns whether the cursor moved.
    pub fn move_by(&mut self, delta: isize) -> Result<bool> {
        self.ensure_showing()?;
        let changed = self.cursor.step(delta)?;
        self.after_move(changed);
        Ok(changed)
    }

    fn after_move(&mut self, changed: bool) {
        self.cache
            .reconcile(&self.cursor.hot_window(), &self.identifiers);
        if changed {
            let position = self.cursor.position();
            debug!(position, "Image changed");
            for callback in self.image_change.iter_mut() {
                callback(position);
            }
        }
    }

    fn ensure_showing(&self) -> Result<()> {
        if self.showing {
            Ok(())
        } else {
            Err(GalleryError::Dismissed)
        }
    }

    pub fn current_index(&self) -> usize {
        self.cursor.position()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn radius(&self) -> usize {
        self.cursor.radius()
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.cursor.policy()
    }

    pub fn hot_window(&self) -> HotWindow {
        self.cursor.hot_window()
    }

    pub fn data(&self) -> &Arc<DataSet<T>> {
        &self.data
    }

    pub fn cache(&self) -> &WindowCache<F> {
        &self.cache
    }

    pub fn identifier(&self, index: usize) -> Option<&str> {
        self.identifiers.get(index).map(String::as_str)
    }

    /// Identifier of the image under the cursor.
    pub fn current_identifier(&self) -> &str {
        &self.identifiers[self.cursor.position()]
    }

    pub fn current_state(&self, index: usize) -> FetchState<F::Payload> {
        self.cache.get(index)
    }

    /// State of the image under the cursor.
    pub fn state(&self) -> FetchState<F::Payload> {
        self.cache.get(self.cursor.position())
    }

    pub fn on_ready<C>(&mut self, callback: C)
    where
        C: FnMut(&ReadyEvent<F::Payload>) + 'static,
    {
        self.cache.on_ready(callback);
    }

    pub fn on_image_change<C: FnMut(usize) + 'static>(&mut self, callback: C) {
        self.image_change.push(Box::new(callback));
    }

    pub fn on_dismiss<C: FnMut() + 'static>(&mut self, callback: C) {
        self.dismiss.push(Box::new(callback));
    }

    pub fn set_scale(&mut self, index: usize, scale: f32) -> Result<f32> {
        self.scales.set_scale(index, scale)
    }

    pub fn get_scale(&self, index: usize) -> f32 {
        self.scales.get_scale(index)
    }

    pub fn reset_scale(&mut self, index: usize) -> bool {
        self.scales.reset(index)
    }

    pub fn is_scaled(&self, index: usize) -> bool {
        self.scales.is_scaled(index)
    }

    /// Back press: unzoom the current image if zoomed, otherwise dismiss.
    pub fn handle_back(&mut self) -> BackAction {
        if !self.showing {
            return BackAction::Ignored;
        }
        let position = self.cursor.position();
        if self.scales.is_scaled(position) {
            self.scales.reset(position);
            BackAction::ResetScale
        } else {
            self.dismiss();
            BackAction::Dismissed
        }
    }

    /// Swipe-to-dismiss gesture. Ignored while zoomed or when disabled.
    pub fn swipe_dismiss(&mut self) -> bool {
        if !self.showing
            || !self.swipe_to_dismiss_allowed
            || self.scales.is_scaled(self.cursor.position())
        {
            return false;
        }
        self.dismiss();
        true
    }

    /// Close the session and cancel every in-flight fetch.
    pub fn dismiss(&mut self) {
        if !self.showing {
            return;
        }
        self.showing = false;
        self.cache.clear();
        info!(position = self.cursor.position(), "Gallery dismissed");
        for callback in self.dismiss.iter_mut() {
            callback();
        }
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    /// Refetch `index` if it failed or is stale. Returns false outside the window.
    pub fn retry(&mut self, index: usize) -> Result<bool> {
        self.ensure_showing()?;
        if !self.cache.invalidate(index) {
            return Ok(false);
        }
        self.cache
            .reconcile(&self.cursor.hot_window(), &self.identifiers);
        Ok(true)
    }

    /// Deliver completions posted by the provider. Returns how many were delivered.
    pub fn pump(&mut self) -> usize {
        self.cache.process_completions()
    }

    /// Like [`pump`](Self::pump), but waits up to `timeout` for the first completion.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        self.cache.wait_completions(timeout)
    }
}

//! Defaults and environment overrides.
//!
//! Precedence, lowest first: built-in defaults, `PAGEWIN_*` environment
//! variables, command-line flags (applied by the binary).

use crate::window::BoundaryPolicy;

/// Prefetch radius around the cursor.
pub const DEFAULT_RADIUS: usize = 1;

/// Default number of decode worker threads.
pub const DEFAULT_WORKERS: usize = 2;

/// Maximum number of decode worker threads.
pub const MAX_WORKERS: usize = 4;

/// Decoded images kept by the file provider's own memory cache.
pub const DEFAULT_MEMORY_ENTRIES: usize = 64;

pub const ENV_RADIUS: &str = "PAGEWIN_RADIUS";
pub const ENV_WORKERS: &str = "PAGEWIN_WORKERS";
pub const ENV_MEMORY_ENTRIES: &str = "PAGEWIN_MEMORY_ENTRIES";

/// Session options, mirroring the knobs of the gallery builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub start_index: usize,
    pub radius: usize,
    pub boundary: BoundaryPolicy,
    /// When false, scale changes are ignored.
    pub zoom_allowed: bool,
    pub swipe_to_dismiss_allowed: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_index: 0,
            radius: DEFAULT_RADIUS,
            boundary: BoundaryPolicy::Clamp,
            zoom_allowed: true,
            swipe_to_dismiss_allowed: true,
        }
    }
}

impl SessionConfig {
    /// Defaults with `PAGEWIN_RADIUS` applied.
    pub fn from_env() -> Self {
        Self::default().with_env(|name| std::env::var(name).ok())
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(radius) = parse_usize(lookup(ENV_RADIUS)) {
            self.radius = radius;
        }
        self
    }
}

/// Provider options read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderConfig {
    pub workers: usize,
    pub memory_entries: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            memory_entries: DEFAULT_MEMORY_ENTRIES,
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self::default().with_env(|name| std::env::var(name).ok())
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(workers) = parse_usize(lookup(ENV_WORKERS)).filter(|w| *w > 0) {
            self.workers = workers.min(MAX_WORKERS);
        }
        if let Some(entries) = parse_usize(lookup(ENV_MEMORY_ENTRIES)).filter(|e| *e > 0) {
            self.memory_entries = entries;
        }
        self
    }
}

/// Unparseable values fall back to the default.
fn parse_usize(value: Option<String>) -> Option<usize> {
    value.and_then(|v| v.trim().parse::<usize>().ok())
}

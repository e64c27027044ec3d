//! Prefetch window around a cursor.
//!
//! This module provides:
//! - `HotWindow` - Indices within the prefetch radius of the cursor
//! - `CursorController` - Current position and move rules
//! - `WindowCache` - Fetch/evict bookkeeping for the hot window

pub mod cache;
pub mod cursor;
pub mod hot_window;

pub use cache::{ReadyCallback, ReadyEvent, WindowCache};
pub use cursor::{BoundaryPolicy, CursorController};
pub use hot_window::HotWindow;

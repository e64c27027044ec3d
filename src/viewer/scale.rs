//! Per-index zoom scale, independent of the cache lifecycle.

use std::collections::HashMap;

use crate::error::{GalleryError, Result};

/// Unzoomed scale.
pub const DEFAULT_SCALE: f32 = 1.0;
/// Maximum zoom scale allowed
pub const MAX_SCALE: f32 = 10.0;
/// Minimum zoom scale allowed
pub const MIN_SCALE: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct ScaleTracker {
    scales: HashMap<usize, f32>,
    len: usize,
    enabled: bool,
}

impl ScaleTracker {
    pub fn new(len: usize, enabled: bool) -> Self {
        Self {
            scales: HashMap::new(),
            len,
            enabled,
        }
    }

    /// Store a clamped scale and return it. Ignored (returns the current
    /// scale) when zooming is disabled.
    pub fn set_scale(&mut self, index: usize, scale: f32) -> Result<f32> {
        self.check(index)?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GalleryError::InvalidScale(scale));
        }
        if !self.enabled {
            return Ok(self.get_scale(index));
        }
        let scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        if scale == DEFAULT_SCALE {
            self.scales.remove(&index);
        } else {
            self.scales.insert(index, scale);
        }
        Ok(scale)
    }

    pub fn get_scale(&self, index: usize) -> f32 {
        self.scales.get(&index).copied().unwrap_or(DEFAULT_SCALE)
    }

    /// Zoomed in past the fitted size.
    pub fn is_scaled(&self, index: usize) -> bool {
        self.get_scale(index) > DEFAULT_SCALE
    }

    /// Back to the default scale. Returns whether anything changed.
    pub fn reset(&mut self, index: usize) -> bool {
        self.scales.remove(&index).is_some()
    }

    pub fn clear(&mut self) {
        self.scales.clear();
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(GalleryError::invalid_index(index, self.len))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_reset() {
        let mut scales = ScaleTracker::new(10, true);
        assert_eq!(scales.set_scale(3, 2.0), Ok(2.0));
        assert!(scales.is_scaled(3));
        assert!(scales.reset(3));
        assert_eq!(scales.get_scale(3), DEFAULT_SCALE);
        assert!(!scales.reset(3));
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut scales = ScaleTracker::new(2, true);
        assert_eq!(scales.set_scale(0, 50.0), Ok(MAX_SCALE));
        assert_eq!(scales.set_scale(1, 0.01), Ok(MIN_SCALE));
        assert!(!scales.is_scaled(1));
    }

    #[test]
    fn test_invalid_scale_and_index() {
        let mut scales = ScaleTracker::new(2, true);
        assert!(matches!(
            scales.set_scale(0, f32::NAN),
            Err(GalleryError::InvalidScale(_))
        ));
        assert_eq!(
            scales.set_scale(0, -1.0),
            Err(GalleryError::InvalidScale(-1.0))
        );
        assert_eq!(
            scales.set_scale(2, 2.0),
            Err(GalleryError::InvalidIndex { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_disabled_ignores_zoom() {
        let mut scales = ScaleTracker::new(4, false);
        assert_eq!(scales.set_scale(1, 3.0), Ok(DEFAULT_SCALE));
        assert!(!scales.is_scaled(1));
    }

    #[test]
    fn test_scales_are_per_index() {
        let mut scales = ScaleTracker::new(4, true);
        scales.set_scale(0, 2.0).unwrap();
        scales.set_scale(1, 3.0).unwrap();
        scales.reset(0);
        assert_eq!(scales.get_scale(1), 3.0);
        scales.clear();
        assert_eq!(scales.get_scale(1), DEFAULT_SCALE);
    }
}

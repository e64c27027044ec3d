//! Cursor over `[0, len)` with a configurable edge policy.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use super::HotWindow;
use crate::error::{GalleryError, Result};

/// What a relative step does when it would leave `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Stop at the first or last item.
    #[default]
    Clamp,
    /// Refuse the step with `InvalidIndex`; the cursor stays put.
    Reject,
    /// Continue from the other end.
    Wrap,
}

impl FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "reject" => Ok(Self::Reject),
            "wrap" => Ok(Self::Wrap),
            other => Err(format!("unknown boundary policy '{other}' (clamp, reject, wrap)")),
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clamp => "clamp",
            Self::Reject => "reject",
            Self::Wrap => "wrap",
        })
    }
}

#[derive(Debug, Clone)]
pub struct CursorController {
    position: usize,
    radius: usize,
    len: usize,
    policy: BoundaryPolicy,
}

impl CursorController {
    pub fn new(start: usize, radius: usize, len: usize, policy: BoundaryPolicy) -> Result<Self> {
        if len == 0 {
            return Err(GalleryError::EmptyDataSet);
        }
        if start >= len {
            return Err(GalleryError::invalid_index(start, len));
        }
        Ok(Self {
            position: start,
            radius,
            len,
            policy,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn hot_window(&self) -> HotWindow {
        HotWindow::around(self.position, self.radius, self.len)
    }

    /// Absolute move. Returns whether the position changed.
    pub fn jump_to(&mut self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(GalleryError::invalid_index(index, self.len));
        }
        Ok(self.set_position(index))
    }

    /// Relative move under the boundary policy. Returns whether the position changed.
    pub fn step(&mut self, delta: isize) -> Result<bool> {
        let len = self.len as isize;
        let target = (self.position as isize).saturating_add(delta);
        let index = if (0..len).contains(&target) {
            target
        } else {
            match self.policy {
                BoundaryPolicy::Clamp => target.clamp(0, len - 1),
                BoundaryPolicy::Reject => {
                    return Err(GalleryError::InvalidIndex {
                        index: target,
                        len: self.len,
                    })
                }
                BoundaryPolicy::Wrap => target.rem_euclid(len),
            }
        };
        Ok(self.set_position(index as usize))
    }

    fn set_position(&mut self, index: usize) -> bool {
        if index == self.position {
            return false;
        }
        trace!(from = self.position, to = index, "Cursor moved");
        self.position = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(start: usize, policy: BoundaryPolicy) -> CursorController {
        CursorController::new(start, 1, 10, policy).unwrap()
    }

    #[test]
    fn test_new_validates_start() {
        assert_eq!(
            CursorController::new(10, 1, 10, BoundaryPolicy::Clamp).unwrap_err(),
            GalleryError::InvalidIndex { index: 10, len: 10 }
        );
        assert_eq!(
            CursorController::new(0, 1, 0, BoundaryPolicy::Clamp).unwrap_err(),
            GalleryError::EmptyDataSet
        );
    }

    #[test]
    fn test_jump_out_of_range_leaves_state() {
        let mut c = cursor(4, BoundaryPolicy::Clamp);
        assert!(c.jump_to(10).is_err());
        assert_eq!(c.position(), 4);
        assert_eq!(c.jump_to(7), Ok(true));
        assert_eq!(c.jump_to(7), Ok(false));
    }

    #[test]
    fn test_step_clamps_at_edges() {
        let mut c = cursor(0, BoundaryPolicy::Clamp);
        assert_eq!(c.step(-1), Ok(false));
        assert_eq!(c.position(), 0);
        assert_eq!(c.step(25), Ok(true));
        assert_eq!(c.position(), 9);
    }

    #[test]
    fn test_step_rejects_at_edges() {
        let mut c = cursor(9, BoundaryPolicy::Reject);
        assert_eq!(
            c.step(1),
            Err(GalleryError::InvalidIndex { index: 10, len: 10 })
        );
        assert_eq!(c.position(), 9);
        assert_eq!(c.step(-2), Ok(true));
        assert_eq!(c.position(), 7);
    }

    #[test]
    fn test_step_wraps() {
        let mut c = cursor(0, BoundaryPolicy::Wrap);
        assert_eq!(c.step(-1), Ok(true));
        assert_eq!(c.position(), 9);
        assert_eq!(c.step(3), Ok(true));
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn test_extreme_delta_saturates() {
        let mut c = cursor(5, BoundaryPolicy::Clamp);
        c.step(isize::MAX).unwrap();
        assert_eq!(c.position(), 9);
        c.step(isize::MIN).unwrap();
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Wrap".parse::<BoundaryPolicy>(), Ok(BoundaryPolicy::Wrap));
        assert!("bounce".parse::<BoundaryPolicy>().is_err());
        assert_eq!(BoundaryPolicy::Reject.to_string(), "reject");
    }
}

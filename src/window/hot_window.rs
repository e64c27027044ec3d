use std::ops::Range;

/// Indices within `radius` of the cursor, cut to `[0, len)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotWindow {
    range: Range<usize>,
}

impl HotWindow {
    pub fn around(cursor: usize, radius: usize, len: usize) -> Self {
        if len == 0 {
            return Self { range: 0..0 };
        }
        let cursor = cursor.min(len - 1);
        let start = cursor.saturating_sub(radius);
        let end = cursor.saturating_add(radius).saturating_add(1).min(len);
        Self { range: start..end }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range.contains(&index)
    }

    pub fn indices(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_cut_at_start() {
        let window = HotWindow::around(0, 1, 10);
        assert_eq!(window.indices().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_window_in_middle() {
        let window = HotWindow::around(5, 1, 10);
        assert_eq!(window.indices().collect::<Vec<_>>(), vec![4, 5, 6]);
        assert!(!window.contains(3));
        assert!(!window.contains(7));
    }

    #[test]
    fn test_window_cut_at_end() {
        let window = HotWindow::around(9, 2, 10);
        assert_eq!(window.indices().collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn test_zero_radius_and_empty() {
        assert_eq!(HotWindow::around(3, 0, 10).len(), 1);
        assert!(HotWindow::around(0, 1, 0).is_empty());
    }

    #[test]
    fn test_huge_radius_does_not_overflow() {
        let window = HotWindow::around(2, usize::MAX, 5);
        assert_eq!((window.start(), window.end()), (0, 5));
    }
}

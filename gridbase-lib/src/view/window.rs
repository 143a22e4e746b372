//! Scroll-window arithmetic.

use std::ops::Range;

/// Rows of overscan on each side of the viewport unless overridden.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Maps a scroll position to the window of row indices that must be
/// materialized, and decides when the viewport is close enough to the end
/// of the loaded rows that the next page should be requested.
///
/// All heights are estimated: total scrollable height is simply row count
/// times the estimated row height (plus one placeholder row while more
/// pages may exist). Per-row measurement is a refinement the engine does
/// not require.
#[derive(Debug, Clone)]
pub struct VirtualWindow {
    viewport_height: u32,
    row_height: u32,
    overscan: usize,
    scroll_offset: u32,
}

impl VirtualWindow {
    /// Creates a window for a viewport of the given pixel height and an
    /// estimated per-row pixel height (treated as at least 1).
    pub fn new(viewport_height: u32, row_height: u32) -> Self {
        Self {
            viewport_height,
            row_height: row_height.max(1),
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0,
        }
    }

    /// Sets the overscan row count.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Updates the scroll offset, in pixels from the top.
    pub fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    /// Returns the current scroll offset.
    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    /// Updates the viewport height.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
    }

    /// Index of the last row intersecting the viewport, ignoring overscan
    /// and how many rows are actually loaded.
    fn last_viewport_index(&self) -> usize {
        let bottom = self.scroll_offset.saturating_add(self.viewport_height);
        (bottom.saturating_sub(1) / self.row_height) as usize
    }

    /// The row indices that must be materialized: the rows intersecting
    /// the viewport plus `overscan` rows on each side, clamped to the
    /// loaded list.
    pub fn visible_range(&self, loaded: usize) -> Range<usize> {
        if loaded == 0 {
            return 0..0;
        }
        let first = (self.scroll_offset / self.row_height) as usize;
        let start = first.saturating_sub(self.overscan).min(loaded);
        let end = (self.last_viewport_index() + self.overscan + 1).min(loaded);
        start..end
    }

    /// Total scrollable height: loaded rows, plus one placeholder row while
    /// more pages may exist, times the estimated row height.
    pub fn total_height(&self, loaded: usize, has_more: bool) -> u64 {
        (loaded as u64 + has_more as u64) * self.row_height as u64
    }

    /// Returns `true` when the last visible-or-overscan row index reaches
    /// within one row of the end of the loaded list.
    ///
    /// This is the window half of the fetch trigger; the caller must also
    /// check that more pages exist and that no fetch is already in flight.
    pub fn wants_next_page(&self, loaded: usize) -> bool {
        if loaded == 0 {
            return true;
        }
        let last = self.last_viewport_index() + self.overscan;
        last + 2 >= loaded
    }
}

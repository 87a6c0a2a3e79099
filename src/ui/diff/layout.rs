//! Uniform-height line layout.
//!
//! Every row has the same height, so all viewport queries are arithmetic.
//! Variable-height rows (folded regions, wrapped lines) would need a prefix
//! sum or interval tree here instead.

use std::ops::Range;

#[derive(Debug, Clone, Default)]
pub struct LayoutManager {
    line_count: usize,
    line_height: f32,
    offsets: Vec<f32>,
}

impl LayoutManager {
    pub fn new(line_count: usize, line_height: f32) -> Self {
        let mut layout = Self::default();
        layout.rebuild(line_count, line_height);
        layout
    }

    /// Recompute every offset. Must run whenever the line count or line
    /// height changes; queries against an old layout return stale offsets.
    pub fn rebuild(&mut self, line_count: usize, line_height: f32) {
        self.line_count = line_count;
        self.line_height = if line_height.is_finite() && line_height > 0.0 {
            line_height
        } else {
            0.0
        };
        self.offsets.clear();
        // Multiplied rather than accumulated so offsets agree with the
        // division in `visible_range`.
        self.offsets
            .extend((0..line_count).map(|index| index as f32 * self.line_height));
    }

    pub fn needs_rebuild(&self, line_count: usize, line_height: f32) -> bool {
        self.line_count != line_count || self.line_height != line_height
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn total_height(&self) -> f32 {
        self.line_count as f32 * self.line_height
    }

    /// Lines from `floor(top / h)` to `ceil(bottom / h)`, widened by
    /// `buffer` rows on each side and clamped to `[0, line_count]`. A
    /// zero-height viewport still yields the line under it.
    pub fn visible_range(&self, viewport_top: f32, viewport_bottom: f32, buffer: usize) -> Range<usize> {
        if self.line_count == 0 || self.line_height <= 0.0 || viewport_bottom < viewport_top {
            return 0..0;
        }
        let top = viewport_top.max(0.0);
        let bottom = viewport_bottom.max(0.0);

        let first = (top / self.line_height).floor() as usize;
        let last = (bottom / self.line_height).ceil() as usize;

        let start = first.saturating_sub(buffer).min(self.line_count);
        let end = last.saturating_add(buffer).min(self.line_count);
        start.min(end)..end
    }

    /// Top of line `index`, or 0 when the index is out of range.
    pub fn line_y(&self, index: usize) -> f32 {
        self.offsets.get(index).copied().unwrap_or(0.0)
    }

    /// Line under vertical offset `y`, clamped to the valid indices.
    pub fn line_index(&self, y: f32) -> usize {
        if self.line_count == 0 || self.line_height <= 0.0 || !y.is_finite() || y <= 0.0 {
            return 0;
        }
        ((y / self.line_height).floor() as usize).min(self.line_count - 1)
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.total_height() - viewport_height).max(0.0)
    }
}

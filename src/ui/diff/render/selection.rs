use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A caret position: row index into the diff and character column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Drag selection. `anchor` is where the drag started and `head` where it
/// is now, so `head` may come before `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: TextPosition,
    pub head: TextPosition,
}

impl Selection {
    pub fn new(anchor: TextPosition, head: TextPosition) -> Self {
        Self { anchor, head }
    }

    /// `(start, end)` with `start <= end` in (line, column) order.
    pub fn normalized(&self) -> (TextPosition, TextPosition) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn lines(&self) -> Range<usize> {
        let (start, end) = self.normalized();
        start.line..end.line + 1
    }

    /// Selected columns of `line`, clamped to its `char_len`. Lines inside
    /// a multi-line selection are selected to their end.
    pub fn columns_on_line(&self, line: usize, char_len: usize) -> Option<Range<usize>> {
        if self.is_empty() {
            return None;
        }
        let (start, end) = self.normalized();
        if line < start.line || line > end.line {
            return None;
        }
        let from = if line == start.line { start.column } else { 0 };
        let to = if line == end.line { end.column } else { char_len };
        let from = from.min(char_len);
        let to = to.min(char_len);
        (from < to).then_some(from..to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_ignores_drag_direction() {
        let forward = Selection::new(TextPosition::new(1, 4), TextPosition::new(3, 2));
        let backward = Selection::new(TextPosition::new(3, 2), TextPosition::new(1, 4));
        assert_eq!(forward.normalized(), backward.normalized());
        assert_eq!(forward.normalized().0, TextPosition::new(1, 4));
    }

    #[test]
    fn same_line_orders_by_column() {
        let sel = Selection::new(TextPosition::new(2, 9), TextPosition::new(2, 3));
        assert_eq!(sel.columns_on_line(2, 20), Some(3..9));
    }

    #[test]
    fn multi_line_columns() {
        let sel = Selection::new(TextPosition::new(5, 1), TextPosition::new(3, 4));
        assert_eq!(sel.lines(), 3..6);
        assert_eq!(sel.columns_on_line(3, 10), Some(4..10));
        assert_eq!(sel.columns_on_line(4, 7), Some(0..7));
        assert_eq!(sel.columns_on_line(5, 10), Some(0..1));
        assert_eq!(sel.columns_on_line(6, 10), None);
    }

    #[test]
    fn columns_clamp_to_line_length() {
        let sel = Selection::new(TextPosition::new(0, 2), TextPosition::new(0, 50));
        assert_eq!(sel.columns_on_line(0, 5), Some(2..5));
        let past_end = Selection::new(TextPosition::new(0, 8), TextPosition::new(0, 9));
        assert_eq!(past_end.columns_on_line(0, 5), None);
    }

    #[test]
    fn empty_selection_selects_nothing() {
        let caret = Selection::new(TextPosition::new(1, 1), TextPosition::new(1, 1));
        assert!(caret.is_empty());
        assert_eq!(caret.columns_on_line(1, 10), None);
    }
}

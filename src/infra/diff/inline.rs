//! Character-level diff between a removed line and the added line that
//! replaces it.

use crate::domain::ChangeRange;
use similar::{ChangeTag, TextDiff};

/// Changed character ranges on both sides of a modified line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineRanges {
    /// Deleted ranges, indexed into the old line.
    pub removed: Vec<ChangeRange>,
    /// Inserted ranges, indexed into the new line.
    pub added: Vec<ChangeRange>,
}

pub fn should_do_inline(old: &str, new: &str, max_len: usize) -> bool {
    old.chars().count() <= max_len && new.chars().count() <= max_len
}

pub fn inline_ranges(old: &str, new: &str) -> InlineRanges {
    let diff = TextDiff::from_chars(old, new);
    let mut ranges = InlineRanges::default();
    let mut old_idx = 0usize;
    let mut new_idx = 0usize;

    for change in diff.iter_all_changes() {
        let len = change.value().chars().count();
        match change.tag() {
            ChangeTag::Equal => {
                old_idx += len;
                new_idx += len;
            }
            ChangeTag::Delete => {
                push_range(&mut ranges.removed, old_idx..old_idx + len);
                old_idx += len;
            }
            ChangeTag::Insert => {
                push_range(&mut ranges.added, new_idx..new_idx + len);
                new_idx += len;
            }
        }
    }

    ranges
}

/// Append `range`, coalescing with the previous range when they touch or
/// overlap. Callers push in ascending order.
fn push_range(ranges: &mut Vec<ChangeRange>, range: ChangeRange) {
    if range.is_empty() {
        return;
    }
    if let Some(last) = ranges.last_mut()
        && range.start <= last.end
    {
        last.end = last.end.max(range.end);
        return;
    }
    ranges.push(range);
}

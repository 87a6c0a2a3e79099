//! Diff data model shared by the engine, the highlighter and the renderer.
//!
//! A [`DiffResult`] is immutable once produced. Every [`DiffLine`] carries a
//! process-unique [`LineId`] that the per-session caches use as their key.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LINE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one logical diff line.
///
/// Ids are allocated from a process-wide counter when a line is constructed,
/// so two lines with equal content never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(u64);

impl LineId {
    pub fn next() -> Self {
        Self(NEXT_LINE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineKind {
    Common,
    Added,
    Removed,
    FileHeader,
    Spacer,
}

impl DiffLineKind {
    /// Whether the line belongs to the old revision.
    pub fn in_source(self) -> bool {
        matches!(self, DiffLineKind::Common | DiffLineKind::Removed)
    }

    /// Whether the line belongs to the new revision.
    pub fn in_target(self) -> bool {
        matches!(self, DiffLineKind::Common | DiffLineKind::Added)
    }

    pub fn is_code(self) -> bool {
        self.in_source() || self.in_target()
    }
}

/// Metadata carried by a synthetic file header line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub filename: String,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub is_new_file: bool,
}

/// Half-open character range inside a line's content.
pub type ChangeRange = Range<usize>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub id: LineId,
    pub kind: DiffLineKind,
    pub content: Arc<str>,
    /// 1-based line number in the old revision.
    pub original_line_number: Option<usize>,
    /// 1-based line number in the new revision.
    pub new_line_number: Option<usize>,
    /// Sorted, non-overlapping character ranges that changed on this line.
    pub changed_ranges: Option<Vec<ChangeRange>>,
    pub file_meta: Option<FileMeta>,
}

impl DiffLine {
    fn new(kind: DiffLineKind, content: impl Into<Arc<str>>) -> Self {
        Self {
            id: LineId::next(),
            kind,
            content: content.into(),
            original_line_number: None,
            new_line_number: None,
            changed_ranges: None,
            file_meta: None,
        }
    }

    pub fn common(content: impl Into<Arc<str>>, old_no: usize, new_no: usize) -> Self {
        let mut line = Self::new(DiffLineKind::Common, content);
        line.original_line_number = Some(old_no);
        line.new_line_number = Some(new_no);
        line
    }

    pub fn removed(content: impl Into<Arc<str>>, old_no: usize) -> Self {
        let mut line = Self::new(DiffLineKind::Removed, content);
        line.original_line_number = Some(old_no);
        line
    }

    pub fn added(content: impl Into<Arc<str>>, new_no: usize) -> Self {
        let mut line = Self::new(DiffLineKind::Added, content);
        line.new_line_number = Some(new_no);
        line
    }

    pub fn file_header(meta: FileMeta) -> Self {
        let mut line = Self::new(DiffLineKind::FileHeader, meta.filename.as_str());
        line.file_meta = Some(meta);
        line
    }

    pub fn spacer() -> Self {
        Self::new(DiffLineKind::Spacer, "")
    }

    /// Content length in characters; change ranges index into this space.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Output of the diff engine: classified lines in unified order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub lines: Vec<DiffLine>,
    pub source_text: Arc<str>,
    pub target_text: Arc<str>,
    pub language: Option<String>,
}

impl DiffResult {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&DiffLine> {
        self.lines.get(index)
    }

    pub fn additions(&self) -> usize {
        self.count_kind(DiffLineKind::Added)
    }

    pub fn deletions(&self) -> usize {
        self.count_kind(DiffLineKind::Removed)
    }

    fn count_kind(&self, kind: DiffLineKind) -> usize {
        self.lines.iter().filter(|line| line.kind == kind).count()
    }

    /// Old-revision lines in order (everything that is not Added).
    pub fn source_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.kind.in_source())
            .map(|line| line.content.as_ref())
    }

    /// New-revision lines in order (everything that is not Removed).
    pub fn target_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.kind.in_target())
            .map(|line| line.content.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_ids_are_unique_for_equal_content() {
        let a = DiffLine::common("same", 1, 1);
        let b = DiffLine::common("same", 1, 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn source_and_target_views_skip_the_other_side() {
        let result = DiffResult {
            lines: vec![
                DiffLine::common("a", 1, 1),
                DiffLine::removed("b", 2),
                DiffLine::added("c", 2),
                DiffLine::spacer(),
            ],
            ..Default::default()
        };

        assert_eq!(result.source_lines().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(result.target_lines().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(result.additions(), 1);
        assert_eq!(result.deletions(), 1);
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        let line = DiffLine::added("héllo", 1);
        assert_eq!(line.char_len(), 5);
    }
}

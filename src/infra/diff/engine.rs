use super::inline::{inline_ranges, should_do_inline};
use crate::domain::{DiffLine, DiffResult};
use similar::{Algorithm, DiffOp, DiffTag};
use std::sync::Arc;

pub const DEFAULT_MAX_INLINE_LEN: usize = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffOptions {
    /// Align lines on their whitespace-stripped form. Common lines then
    /// carry the new revision's text.
    pub ignore_whitespace: bool,
    pub max_inline_len: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace: false,
            max_inline_len: DEFAULT_MAX_INLINE_LEN,
        }
    }
}

pub fn diff(old_text: &str, new_text: &str) -> DiffResult {
    diff_with_options(old_text, new_text, DiffOptions::default())
}

pub fn diff_with_options(old_text: &str, new_text: &str, options: DiffOptions) -> DiffResult {
    let old_lines = split_lines(old_text);
    let new_lines = split_lines(new_text);

    let old_key_storage = normalized_keys(&old_lines, options.ignore_whitespace);
    let new_key_storage = normalized_keys(&new_lines, options.ignore_whitespace);

    let old_keys: Vec<&str> = match &old_key_storage {
        Some(keys) => keys.iter().map(String::as_str).collect(),
        None => old_lines.clone(),
    };
    let new_keys: Vec<&str> = match &new_key_storage {
        Some(keys) => keys.iter().map(String::as_str).collect(),
        None => new_lines.clone(),
    };

    let ops = similar::capture_diff_slices(Algorithm::Patience, &old_keys, &new_keys);
    log::debug!(
        target: "diff",
        "aligned {} old / {} new lines in {} ops",
        old_lines.len(),
        new_lines.len(),
        ops.len()
    );

    let mut lines = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    for op in &ops {
        push_lines_for_op(op, &old_lines, &new_lines, options, &mut lines);
    }

    DiffResult {
        lines,
        source_text: Arc::from(old_text),
        target_text: Arc::from(new_text),
        language: None,
    }
}

/// Split on line boundaries; a trailing newline does not open a new line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

fn normalized_keys(lines: &[&str], ignore_whitespace: bool) -> Option<Vec<String>> {
    ignore_whitespace.then(|| {
        lines
            .iter()
            .map(|line| line.chars().filter(|ch| !ch.is_whitespace()).collect())
            .collect()
    })
}

fn push_lines_for_op(
    op: &DiffOp,
    old_lines: &[&str],
    new_lines: &[&str],
    options: DiffOptions,
    out: &mut Vec<DiffLine>,
) {
    match op.tag() {
        DiffTag::Equal => {
            for (old_index, new_index) in op.old_range().zip(op.new_range()) {
                let Some(text) = new_lines.get(new_index) else {
                    continue;
                };
                out.push(DiffLine::common(*text, old_index + 1, new_index + 1));
            }
        }
        DiffTag::Delete => push_removed(op.old_range(), old_lines, out),
        DiffTag::Insert => push_added(op.new_range(), new_lines, out),
        DiffTag::Replace => push_replace(op, old_lines, new_lines, options, out),
    }
}

fn push_removed(range: std::ops::Range<usize>, old_lines: &[&str], out: &mut Vec<DiffLine>) {
    for old_index in range {
        if let Some(text) = old_lines.get(old_index) {
            out.push(DiffLine::removed(*text, old_index + 1));
        }
    }
}

fn push_added(range: std::ops::Range<usize>, new_lines: &[&str], out: &mut Vec<DiffLine>) {
    for new_index in range {
        if let Some(text) = new_lines.get(new_index) {
            out.push(DiffLine::added(*text, new_index + 1));
        }
    }
}

/// A replaced block is emitted as removed/added pairs followed by whatever
/// one side has left over, so every pair is adjacent for inline diffing.
fn push_replace(
    op: &DiffOp,
    old_lines: &[&str],
    new_lines: &[&str],
    options: DiffOptions,
    out: &mut Vec<DiffLine>,
) {
    let old_range = op.old_range();
    let new_range = op.new_range();
    let paired = old_range.len().min(new_range.len());

    for offset in 0..paired {
        let old_index = old_range.start + offset;
        let new_index = new_range.start + offset;
        let (Some(old_text), Some(new_text)) = (old_lines.get(old_index), new_lines.get(new_index))
        else {
            continue;
        };

        let mut removed = DiffLine::removed(*old_text, old_index + 1);
        let mut added = DiffLine::added(*new_text, new_index + 1);
        if should_do_inline(old_text, new_text, options.max_inline_len) {
            let ranges = inline_ranges(old_text, new_text);
            removed.changed_ranges = Some(ranges.removed);
            added.changed_ranges = Some(ranges.added);
        }
        out.push(removed);
        out.push(added);
    }

    push_removed(old_range.start + paired..old_range.end, old_lines, out);
    push_added(new_range.start + paired..new_range.end, new_lines, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiffLineKind;

    fn kinds(result: &DiffResult) -> Vec<DiffLineKind> {
        result.lines.iter().map(|line| line.kind).collect()
    }

    #[test]
    fn test_empty_pair_is_empty_common_sequence() {
        let result = diff("", "");
        assert!(result.is_empty());
    }

    #[test]
    fn test_identical_texts_are_all_common() {
        let result = diff("a\nb\nc\n", "a\nb\nc\n");
        assert_eq!(kinds(&result), vec![DiffLineKind::Common; 3]);
        assert_eq!(result.lines[2].original_line_number, Some(3));
        assert_eq!(result.lines[2].new_line_number, Some(3));
    }

    #[test]
    fn test_modified_line_gets_pairwise_inline_ranges() {
        let result = diff("fn a() {\n    let x = 1;\n}\n", "fn a() {\n    let x = 2;\n}\n");
        assert_eq!(
            kinds(&result),
            vec![
                DiffLineKind::Common,
                DiffLineKind::Removed,
                DiffLineKind::Added,
                DiffLineKind::Common,
            ]
        );
        let added = &result.lines[2];
        assert_eq!(added.changed_ranges.as_deref(), Some(&[12..13][..]));
        let removed = &result.lines[1];
        assert_eq!(removed.changed_ranges.as_deref(), Some(&[12..13][..]));
    }

    #[test]
    fn test_replace_blocks_interleave_pairs() {
        let result = diff("x\na\nb\ny\n", "x\nA\nB\nC\ny\n");
        assert_eq!(
            kinds(&result),
            vec![
                DiffLineKind::Common,
                DiffLineKind::Removed,
                DiffLineKind::Added,
                DiffLineKind::Removed,
                DiffLineKind::Added,
                DiffLineKind::Added,
                DiffLineKind::Common,
            ]
        );
        let last_added = &result.lines[5];
        assert_eq!(last_added.new_line_number, Some(4));
        assert!(last_added.changed_ranges.is_none());
    }

    #[test]
    fn test_additions_only_has_no_inline_ranges() {
        let result = diff("", "one\ntwo\n");
        assert_eq!(kinds(&result), vec![DiffLineKind::Added; 2]);
        assert!(result.lines.iter().all(|line| line.changed_ranges.is_none()));

        let result = diff("one\ntwo\n", "");
        assert_eq!(kinds(&result), vec![DiffLineKind::Removed; 2]);
        assert!(result.lines.iter().all(|line| line.changed_ranges.is_none()));
    }

    #[test]
    fn test_ignore_whitespace_aligns_reindented_lines() {
        let options = DiffOptions {
            ignore_whitespace: true,
            ..Default::default()
        };
        let result = diff_with_options("if x {\nfoo();\n}\n", "if x {\n    foo();\n}\n", options);
        assert_eq!(kinds(&result), vec![DiffLineKind::Common; 3]);
        assert_eq!(result.lines[1].content.as_ref(), "    foo();");
    }

    #[test]
    fn test_source_and_target_text_are_kept() {
        let result = diff("a\n", "b\n");
        assert_eq!(result.source_text.as_ref(), "a\n");
        assert_eq!(result.target_text.as_ref(), "b\n");
    }
}

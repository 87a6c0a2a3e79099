//! Property tests for the diff engine: both revisions can be read back from
//! the classified lines, and character ranges are always well formed.

use diffsurface::domain::{DiffLineKind, DiffResult};
use diffsurface::infra::diff::{DiffOptions, diff, diff_with_options};
use proptest::prelude::*;

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[abcé ]{0,8}", 0..24).prop_map(|lines| lines.join("\n"))
}

fn assert_ranges_valid(result: &DiffResult) -> Result<(), TestCaseError> {
    for line in &result.lines {
        let Some(ranges) = &line.changed_ranges else {
            continue;
        };
        prop_assert!(matches!(line.kind, DiffLineKind::Added | DiffLineKind::Removed));
        let len = line.char_len();
        for range in ranges {
            prop_assert!(range.start < range.end, "empty range {range:?}");
            prop_assert!(range.end <= len, "range {range:?} past {len}");
        }
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].end < pair[1].start, "unsorted {:?}", ranges);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn both_revisions_round_trip(old in text_strategy(), new in text_strategy()) {
        let result = diff(&old, &new);
        let source: Vec<&str> = result.source_lines().collect();
        let target: Vec<&str> = result.target_lines().collect();
        prop_assert_eq!(source, old.lines().collect::<Vec<_>>());
        prop_assert_eq!(target, new.lines().collect::<Vec<_>>());
    }

    #[test]
    fn change_ranges_are_sorted_and_in_bounds(old in text_strategy(), new in text_strategy()) {
        assert_ranges_valid(&diff(&old, &new))?;
    }

    #[test]
    fn line_numbers_count_up_on_each_side(old in text_strategy(), new in text_strategy()) {
        let result = diff(&old, &new);
        let olds: Vec<usize> = result.lines.iter().filter_map(|l| l.original_line_number).collect();
        let news: Vec<usize> = result.lines.iter().filter_map(|l| l.new_line_number).collect();
        prop_assert_eq!(olds, (1..=old.lines().count()).collect::<Vec<_>>());
        prop_assert_eq!(news, (1..=new.lines().count()).collect::<Vec<_>>());
    }

    #[test]
    fn ignoring_whitespace_keeps_new_side(old in text_strategy(), new in text_strategy()) {
        let options = DiffOptions { ignore_whitespace: true, ..DiffOptions::default() };
        let result = diff_with_options(&old, &new, options);
        let target: Vec<&str> = result.target_lines().collect();
        prop_assert_eq!(target, new.lines().collect::<Vec<_>>());
        assert_ranges_valid(&result)?;
    }
}

#[test]
fn identical_texts_are_all_common() {
    let text = "a\nb\nc\n";
    let result = diff(text, text);
    assert_eq!(result.line_count(), 3);
    assert!(result.lines.iter().all(|l| l.kind == DiffLineKind::Common));
    assert_eq!(result.additions() + result.deletions(), 0);
}

#[test]
fn replaced_line_marks_only_the_changed_characters() {
    let result = diff("let total = 10;\n", "let total = 12;\n");
    let added = result
        .lines
        .iter()
        .find(|l| l.kind == DiffLineKind::Added)
        .unwrap();
    assert_eq!(added.changed_ranges.as_deref(), Some(&[13..14][..]));
    let removed = result
        .lines
        .iter()
        .find(|l| l.kind == DiffLineKind::Removed)
        .unwrap();
    assert_eq!(removed.changed_ranges.as_deref(), Some(&[13..14][..]));
}

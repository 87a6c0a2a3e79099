//! Merge-conflict marker scanning and resolution.

use crate::domain::{ConflictRegion, ConflictResolution, DiffLine, DiffResult};
use crate::infra::diff::diff;
use std::sync::Arc;

const OURS_MARKER: &str = "<<<<<<<";
const BASE_MARKER: &str = "|||||||";
const SEPARATOR_MARKER: &str = "=======";
const THEIRS_MARKER: &str = ">>>>>>>";

/// A conflicted text and the regions found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSet {
    lines: Vec<String>,
    trailing_newline: bool,
    regions: Vec<ConflictRegion>,
}

pub fn parse_conflicts(text: &str) -> ConflictSet {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let regions = scan_regions(&lines);
    log::debug!(target: "conflict", "found {} conflict regions", regions.len());

    ConflictSet {
        lines,
        trailing_newline: text.ends_with('\n'),
        regions,
    }
}

fn marker_label<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix(' ').map(str::trim)
}

#[derive(Default)]
struct PendingRegion {
    start: usize,
    ours_label: Option<String>,
    base: Option<usize>,
    separator: Option<usize>,
}

fn scan_regions(lines: &[String]) -> Vec<ConflictRegion> {
    let mut regions = Vec::new();
    let mut pending: Option<PendingRegion> = None;

    for (index, line) in lines.iter().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        // A fresh opening marker restarts the scan, so nested conflicts
        // resolve to the innermost block.
        if let Some(label) = marker_label(line, OURS_MARKER) {
            pending = Some(PendingRegion {
                start: index,
                ours_label: (!label.is_empty()).then(|| label.to_string()),
                ..Default::default()
            });
            continue;
        }

        let Some(current) = pending.as_mut() else {
            continue;
        };

        if marker_label(line, BASE_MARKER).is_some()
            && current.base.is_none()
            && current.separator.is_none()
        {
            current.base = Some(index);
        } else if line.starts_with(SEPARATOR_MARKER) && current.separator.is_none() {
            current.separator = Some(index);
        } else if let Some(label) = marker_label(line, THEIRS_MARKER)
            && let Some(separator) = current.separator
        {
            let ours_end = current.base.unwrap_or(separator);
            let base_text = current
                .base
                .map(|base| join_block(&lines[base + 1..separator]));

            regions.push(ConflictRegion {
                id: regions.len(),
                start_line_index: current.start,
                base_line_index: current.base,
                separator_line_index: separator,
                end_line_index: index,
                ours_label: current
                    .ours_label
                    .take()
                    .unwrap_or_else(|| "HEAD".to_string()),
                theirs_label: if label.is_empty() {
                    "incoming".to_string()
                } else {
                    label.to_string()
                },
                ours_text: join_block(&lines[current.start + 1..ours_end]),
                theirs_text: join_block(&lines[separator + 1..index]),
                base_text,
                resolution: None,
            });
            pending = None;
        }
    }

    regions
}

fn join_block(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.strip_suffix('\r').unwrap_or(line));
        text.push('\n');
    }
    text
}

impl ConflictSet {
    pub fn regions(&self) -> &[ConflictRegion] {
        &self.regions
    }

    pub fn region(&self, id: usize) -> Option<&ConflictRegion> {
        self.regions.get(id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns false when no region has this id.
    pub fn resolve(&mut self, id: usize, resolution: ConflictResolution) -> bool {
        match self.regions.get_mut(id) {
            Some(region) => {
                region.resolution = Some(resolution);
                true
            }
            None => false,
        }
    }

    pub fn clear_resolution(&mut self, id: usize) -> bool {
        match self.regions.get_mut(id) {
            Some(region) => {
                region.resolution = None;
                true
            }
            None => false,
        }
    }

    pub fn unresolved_count(&self) -> usize {
        self.regions.iter().filter(|r| !r.is_resolved()).count()
    }

    /// The text with resolved regions collapsed to their chosen side.
    /// Unresolved regions are kept verbatim, markers included.
    pub fn resolved_text(&self) -> String {
        let mut out = String::new();
        let mut regions = self.regions.iter().peekable();
        let mut index = 0;

        while index < self.lines.len() {
            if let Some(region) = regions.peek()
                && region.start_line_index == index
            {
                match region.resolved_text() {
                    Some(text) => out.push_str(&text),
                    None => {
                        out.push_str(&join_block(
                            &self.lines[region.start_line_index..=region.end_line_index],
                        ));
                    }
                }
                index = region.end_line_index + 1;
                regions.next();
                continue;
            }
            out.push_str(&self.lines[index]);
            out.push('\n');
            index += 1;
        }

        if !self.trailing_newline && out.ends_with('\n') {
            out.pop();
        }
        out
    }

    /// Project the merge view into a diff: the old stream is the "ours"
    /// file and the new stream the "theirs" file. Lines outside conflicts
    /// and resolved regions are common; each unresolved region is a line
    /// diff from ours to theirs, framed by spacer rows where the markers
    /// were.
    pub fn to_diff_result(&self) -> DiffResult {
        let mut lines = Vec::with_capacity(self.lines.len());
        let mut old_no = 1usize;
        let mut new_no = 1usize;
        let mut regions = self.regions.iter().peekable();
        let mut index = 0;

        while index < self.lines.len() {
            if let Some(region) = regions.peek()
                && region.start_line_index == index
            {
                match region.resolved_text() {
                    Some(text) => {
                        for line in text.lines() {
                            lines.push(DiffLine::common(line, old_no, new_no));
                            old_no += 1;
                            new_no += 1;
                        }
                    }
                    None => {
                        lines.push(DiffLine::spacer());
                        let block = diff(&region.ours_text, &region.theirs_text);
                        for mut line in block.lines {
                            if let Some(n) = line.original_line_number.as_mut() {
                                *n += old_no - 1;
                            }
                            if let Some(n) = line.new_line_number.as_mut() {
                                *n += new_no - 1;
                            }
                            lines.push(line);
                        }
                        old_no += region.ours_text.lines().count();
                        new_no += region.theirs_text.lines().count();
                        lines.push(DiffLine::spacer());
                    }
                }
                index = region.end_line_index + 1;
                regions.next();
                continue;
            }

            lines.push(DiffLine::common(self.lines[index].as_str(), old_no, new_no));
            old_no += 1;
            new_no += 1;
            index += 1;
        }

        let mut result = DiffResult {
            lines,
            ..Default::default()
        };
        result.source_text = Arc::from(collect_side(&result, true));
        result.target_text = Arc::from(collect_side(&result, false));
        result
    }
}

fn collect_side(result: &DiffResult, source: bool) -> String {
    let mut text = String::new();
    let lines: Box<dyn Iterator<Item = &str>> = if source {
        Box::new(result.source_lines())
    } else {
        Box::new(result.target_lines())
    };
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiffLineKind;

    const SIMPLE: &str = "before\n<<<<<<< HEAD\nours\n=======\ntheirs\n>>>>>>> branch\nafter\n";

    #[test]
    fn parses_conflicts_without_base() {
        let set = parse_conflicts(SIMPLE);
        assert_eq!(set.len(), 1);

        let region = &set.regions()[0];
        assert_eq!(region.start_line_index, 1);
        assert_eq!(region.separator_line_index, 3);
        assert_eq!(region.end_line_index, 5);
        assert_eq!(region.ours_label, "HEAD");
        assert_eq!(region.theirs_label, "branch");
        assert_eq!(region.ours_text, "ours\n");
        assert_eq!(region.theirs_text, "theirs\n");
        assert!(region.base_text.is_none());
        assert!(!region.is_resolved());
    }

    #[test]
    fn parses_conflicts_with_base() {
        let text = "before\n<<<<<<< ours\none\n||||||| base\nbase line\n=======\ntwo\n>>>>>>> theirs\nafter\n";
        let set = parse_conflicts(text);
        let region = &set.regions()[0];
        assert_eq!(region.base_line_index, Some(3));
        assert_eq!(region.ours_text, "one\n");
        assert_eq!(region.theirs_text, "two\n");
        assert_eq!(region.base_text.as_deref(), Some("base line\n"));
    }

    #[test]
    fn prefers_nested_conflict() {
        let text = "before\n<<<<<<< HEAD\nouter ours\n<<<<<<< HEAD\ninner ours\n=======\ninner theirs\n>>>>>>> inner\n=======\nouter theirs\n>>>>>>> outer\nafter\n";
        let set = parse_conflicts(text);
        assert_eq!(set.len(), 1);
        let region = &set.regions()[0];
        assert_eq!(region.theirs_label, "inner");
        assert_eq!(region.ours_text, "inner ours\n");
        assert_eq!(region.theirs_text, "inner theirs\n");
    }

    #[test]
    fn handles_conflict_markers_at_eof() {
        let set = parse_conflicts("<<<<<<< ours\n=======\ntheirs\n>>>>>>>");
        assert_eq!(set.len(), 1);
        assert_eq!(set.regions()[0].ours_label, "ours");
        assert_eq!(set.regions()[0].theirs_label, "incoming");
        assert_eq!(set.regions()[0].ours_text, "");
    }

    #[test]
    fn resolving_rewrites_text() {
        let mut set = parse_conflicts(SIMPLE);
        assert_eq!(set.resolved_text(), SIMPLE);

        assert!(set.resolve(0, ConflictResolution::Theirs));
        assert!(!set.resolve(7, ConflictResolution::Ours));
        assert_eq!(set.unresolved_count(), 0);
        assert_eq!(set.resolved_text(), "before\ntheirs\nafter\n");

        set.resolve(0, ConflictResolution::Both);
        assert_eq!(set.resolved_text(), "before\nours\ntheirs\nafter\n");

        set.clear_resolution(0);
        assert_eq!(set.unresolved_count(), 1);
    }

    #[test]
    fn missing_trailing_newline_is_preserved() {
        let mut set = parse_conflicts("a\n<<<<<<< x\n1\n=======\n2\n>>>>>>> y\nz");
        set.resolve(0, ConflictResolution::Ours);
        assert_eq!(set.resolved_text(), "a\n1\nz");
    }

    #[test]
    fn merge_view_projects_ours_and_theirs() {
        let set = parse_conflicts(SIMPLE);
        let result = set.to_diff_result();
        let kinds: Vec<_> = result.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiffLineKind::Common,
                DiffLineKind::Spacer,
                DiffLineKind::Removed,
                DiffLineKind::Added,
                DiffLineKind::Spacer,
                DiffLineKind::Common,
            ]
        );
        let after = result.lines.last().unwrap();
        assert_eq!(after.original_line_number, Some(3));
        assert_eq!(after.new_line_number, Some(3));
        assert_eq!(result.source_text.as_ref(), "before\nours\nafter\n");
        assert_eq!(result.target_text.as_ref(), "before\ntheirs\nafter\n");
    }

    #[test]
    fn merge_view_shows_resolved_regions_as_common() {
        let mut set = parse_conflicts(SIMPLE);
        set.resolve(0, ConflictResolution::Ours);
        let result = set.to_diff_result();
        assert!(
            result
                .lines
                .iter()
                .all(|line| line.kind == DiffLineKind::Common)
        );
        assert_eq!(result.line_count(), 3);
    }
}

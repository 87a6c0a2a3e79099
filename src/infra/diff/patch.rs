//! Unified-diff patch parsing.
//!
//! Parsing never fails: unknown lines are skipped and a hunk header whose
//! numbers do not parse leaves the line counters where they were.

use super::language::resolve_language;
use crate::domain::{DiffLine, DiffLineKind, DiffResult, FileMeta};
use std::sync::Arc;

pub const DEFAULT_SPACER_LINES: usize = 2;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";
const DEV_NULL: &str = "/dev/null";

/// Parse a single-file unified diff.
///
/// `filename` is used when the patch carries no file identity lines;
/// `language` always wins over detection from the filename.
pub fn from_patch(patch_text: &str, language: Option<&str>, filename: Option<&str>) -> DiffResult {
    let raw_lines: Vec<&str> = patch_text.lines().collect();

    let header = scan_header(&raw_lines);
    let body = parse_body(&raw_lines);

    let filename = header
        .filename
        .clone()
        .or_else(|| filename.map(str::to_string))
        .unwrap_or_default();
    let language = resolve_language(language, Some(filename.as_str()));

    log::debug!(
        target: "diff",
        "patch {}: +{} -{} ({} body lines)",
        filename,
        header.added,
        header.removed,
        body.len()
    );

    let mut lines = Vec::with_capacity(body.len() + 1);
    lines.push(DiffLine::file_header(FileMeta {
        filename,
        lines_added: header.added,
        lines_removed: header.removed,
        is_new_file: header.is_new_file,
    }));
    lines.extend(body);

    let mut result = DiffResult {
        lines,
        language,
        ..Default::default()
    };
    result.source_text = join_lines(result.source_lines());
    result.target_text = join_lines(result.target_lines());
    result
}

/// Concatenate single-file results, separating files with spacer rows.
/// The first language found wins. Line numbers restart per file.
pub fn from_patches<I>(results: I, spacer_lines: usize) -> DiffResult
where
    I: IntoIterator<Item = DiffResult>,
{
    let mut combined = DiffResult::default();
    let mut source = String::new();
    let mut target = String::new();

    for (index, result) in results.into_iter().enumerate() {
        if index > 0 {
            combined
                .lines
                .extend(std::iter::repeat_with(DiffLine::spacer).take(spacer_lines));
        }
        if combined.language.is_none() {
            combined.language = result.language;
        }
        source.push_str(&result.source_text);
        target.push_str(&result.target_text);
        combined.lines.extend(result.lines);
    }

    combined.source_text = Arc::from(source);
    combined.target_text = Arc::from(target);
    combined
}

/// Split a multi-file git patch on `diff --git` boundaries and parse each
/// file separately. `filename` names any section without file identity
/// lines, such as a bare hunk.
pub fn from_multi_file_patch(
    patch_text: &str,
    language: Option<&str>,
    filename: Option<&str>,
    spacer_lines: usize,
) -> DiffResult {
    let results = split_patch_by_file(patch_text)
        .into_iter()
        .map(|section| from_patch(&section, language, filename));
    from_patches(results, spacer_lines)
}

pub fn split_patch_by_file(patch_text: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in patch_text.lines() {
        if line.starts_with("diff --git ") && !current.trim().is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        sections.push(current);
    }
    sections
}

#[derive(Debug, Default)]
struct PatchHeader {
    filename: Option<String>,
    is_new_file: bool,
    added: usize,
    removed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HunkHeader {
    old_start: Option<usize>,
    old_len: Option<usize>,
    new_start: Option<usize>,
    new_len: Option<usize>,
}

/// Tracks whether the walk is inside a hunk body and how many old/new lines
/// the header promised. The counts only disambiguate `--- `/`+++ ` lines,
/// which are file headers once a hunk is exhausted and removals/additions
/// of `-- `/`++ ` text before that.
#[derive(Debug, Default)]
struct HunkCursor {
    in_hunk: bool,
    old_remaining: Option<usize>,
    new_remaining: Option<usize>,
}

impl HunkCursor {
    fn enter(&mut self, header: &HunkHeader) {
        self.in_hunk = true;
        self.old_remaining = header.old_len;
        self.new_remaining = header.new_len;
    }

    fn exit(&mut self) {
        *self = Self::default();
    }

    fn expects_body(&self) -> bool {
        self.in_hunk && !(self.old_remaining == Some(0) && self.new_remaining == Some(0))
    }

    fn consume(&mut self, kind: DiffLineKind) {
        if kind.in_source() {
            self.old_remaining = self.old_remaining.map(|n| n.saturating_sub(1));
        }
        if kind.in_target() {
            self.new_remaining = self.new_remaining.map(|n| n.saturating_sub(1));
        }
    }
}

fn is_file_identity_line(line: &str) -> bool {
    line.starts_with("--- ") || line.starts_with("+++ ")
}

fn classify(line: &str) -> Option<DiffLineKind> {
    match line.as_bytes().first() {
        Some(b'+') => Some(DiffLineKind::Added),
        Some(b'-') => Some(DiffLineKind::Removed),
        Some(b' ') => Some(DiffLineKind::Common),
        _ => None,
    }
}

/// Pass 1: file identity, new-file flag and added/removed totals.
fn scan_header(lines: &[&str]) -> PatchHeader {
    let mut header = PatchHeader::default();
    let mut cursor = HunkCursor::default();
    // Set once the first file's identity is complete; later files only
    // contribute to the added/removed totals.
    let mut identity_done = false;

    for line in lines {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            cursor.exit();
            if header.filename.is_some() {
                identity_done = true;
            } else if !identity_done {
                header.filename = git_header_path(rest);
            }
            continue;
        }
        if line.starts_with("@@") {
            if header.filename.is_some() {
                identity_done = true;
            }
            cursor.enter(&parse_hunk_header(line));
            continue;
        }
        if !cursor.expects_body() && is_file_identity_line(line) {
            cursor.exit();
            if identity_done {
                continue;
            }
            let path = identity_path(&line[4..]);
            if path == DEV_NULL {
                if line.starts_with("--- ") {
                    header.is_new_file = true;
                }
            } else if line.starts_with("+++ ") {
                header.filename = Some(strip_git_prefix(&path));
            } else if header.filename.is_none() {
                // Deleted files only name themselves on the `---` side.
                header.filename = Some(strip_git_prefix(&path));
            }
            continue;
        }
        if line.starts_with("new file mode") {
            if !identity_done {
                header.is_new_file = true;
            }
            continue;
        }

        match classify(line) {
            Some(DiffLineKind::Added) => header.added += 1,
            Some(DiffLineKind::Removed) => header.removed += 1,
            _ => {}
        }
        if cursor.in_hunk
            && let Some(kind) = classify(line)
        {
            cursor.consume(kind);
        }
    }

    header
}

/// Pass 2: classified body lines with old/new numbering.
fn parse_body(lines: &[&str]) -> Vec<DiffLine> {
    let mut out = Vec::new();
    let mut cursor = HunkCursor::default();
    let mut old_no = 1usize;
    let mut new_no = 1usize;

    for line in lines {
        if line.starts_with("diff --git ") {
            cursor.exit();
            continue;
        }
        if line.starts_with("@@") {
            let hunk = parse_hunk_header(line);
            if let Some(start) = hunk.old_start {
                old_no = start;
            }
            if let Some(start) = hunk.new_start {
                new_no = start;
            }
            cursor.enter(&hunk);
            continue;
        }
        if !cursor.in_hunk {
            continue;
        }
        if !cursor.expects_body() && is_file_identity_line(line) {
            cursor.exit();
            continue;
        }
        if *line == NO_NEWLINE_MARKER {
            continue;
        }

        let Some(kind) = classify(line) else {
            continue;
        };
        let content = &line[1..];
        match kind {
            DiffLineKind::Added => {
                out.push(DiffLine::added(content, new_no));
                new_no += 1;
            }
            DiffLineKind::Removed => {
                out.push(DiffLine::removed(content, old_no));
                old_no += 1;
            }
            _ => {
                out.push(DiffLine::common(content, old_no, new_no));
                old_no += 1;
                new_no += 1;
            }
        }
        cursor.consume(kind);
    }

    out
}

fn parse_hunk_header(line: &str) -> HunkHeader {
    let mut header = HunkHeader::default();
    let inner = line
        .trim_start_matches('@')
        .split("@@")
        .next()
        .unwrap_or_default();

    for part in inner.split_whitespace() {
        if let Some(old) = part.strip_prefix('-') {
            (header.old_start, header.old_len) = parse_range(old);
        } else if let Some(new) = part.strip_prefix('+') {
            (header.new_start, header.new_len) = parse_range(new);
        }
    }
    header
}

/// `start[,len]`; an omitted length means one line.
fn parse_range(text: &str) -> (Option<usize>, Option<usize>) {
    let mut parts = text.splitn(2, ',');
    let start = parts.next().and_then(|s| s.parse().ok());
    let len = match parts.next() {
        Some(len) => len.parse().ok(),
        None => start.map(|_| 1),
    };
    (start, len)
}

fn git_header_path(rest: &str) -> Option<String> {
    let mut parts = rest.split_whitespace();
    let a_path = parts.next()?;
    let b_path = parts.next().unwrap_or(a_path);
    Some(strip_git_prefix(b_path))
}

/// Path portion of a `---`/`+++` line, without any trailing timestamp.
fn identity_path(rest: &str) -> String {
    rest.split('\t').next().unwrap_or_default().trim().to_string()
}

fn strip_git_prefix(path: &str) -> String {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
        .to_string()
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Arc<str> {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    Arc::from(text)
}

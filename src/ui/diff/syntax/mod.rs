//! Syntax highlight coordinator.
//!
//! Owns the per-session token and color caches (keyed by [`LineId`]),
//! dispatches highlight jobs to worker threads, and applies their results
//! on the owner thread. Every job carries the generation it was started
//! under; results from an older generation are dropped on arrival.

pub mod parser;
pub mod shared_cache;
pub mod tokens;
pub mod worker;

pub use parser::{has_grammar, highlight, highlight_document};
pub use shared_cache::{LineHighlight, SharedKey, SharedSyntaxCache};
pub use tokens::{ScopeCategory, StyledToken, paint_colors, resolve_overlaps};

use crate::domain::{DiffLine, DiffLineKind, DiffResult, LineId};
use crate::infra::diff::detect_language;
use crate::ui::diff::render::types::Color;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};
use worker::{HighlightBatch, HighlightDocument, HighlightJob, spawn_job};

pub const DEFAULT_OVERLAP_THRESHOLD: f32 = 0.5;

pub struct SyntaxCoordinator {
    shared: SharedSyntaxCache,
    is_dark: bool,
    overlap_threshold: f32,
    generation: u64,
    tokens: HashMap<LineId, Arc<[StyledToken]>>,
    colors: HashMap<LineId, Arc<[Color]>>,
    requested: HashSet<LineId>,
    in_flight: usize,
    tx: Sender<HighlightBatch>,
    rx: Receiver<HighlightBatch>,
}

impl SyntaxCoordinator {
    pub fn new(shared: SharedSyntaxCache, is_dark: bool, overlap_threshold: f32) -> Self {
        let (tx, rx) = channel();
        Self {
            shared,
            is_dark,
            overlap_threshold,
            generation: 0,
            tokens: HashMap::new(),
            colors: HashMap::new(),
            requested: HashSet::new(),
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark
    }

    pub fn shared(&self) -> &SharedSyntaxCache {
        &self.shared
    }

    /// Jobs dispatched whose batch has not been received yet, stale or not.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn cached_lines(&self) -> usize {
        self.colors.len().max(self.tokens.len())
    }

    pub fn tokens(&self, id: LineId) -> Option<&[StyledToken]> {
        self.tokens.get(&id).map(|t| t.as_ref())
    }

    pub fn colors(&self, id: LineId) -> Option<&[Color]> {
        self.colors.get(&id).map(|c| c.as_ref())
    }

    /// Content replaced: forget everything and supersede in-flight jobs.
    pub fn reset(&mut self) {
        self.bump_generation();
    }

    /// Returns true when the appearance actually changed. Caches are
    /// cleared before this returns.
    pub fn set_appearance(&mut self, is_dark: bool) -> bool {
        if self.is_dark == is_dark {
            return false;
        }
        self.is_dark = is_dark;
        self.bump_generation();
        true
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        self.tokens.clear();
        self.colors.clear();
        self.requested.clear();
        log::debug!(target: "syntax", "highlight generation -> {}", self.generation);
    }

    /// Make sure every code line of `result` inside `window` is highlighted
    /// or on its way. Lines found in the shared cache are adopted at once;
    /// the rest are sent to a worker together with their side's context.
    /// Returns the number of lines dispatched.
    pub fn request(&mut self, result: &DiffResult, window: Range<usize>) -> usize {
        self.request_within(result, window.clone(), window)
    }

    /// Like [`request`](Self::request), but only lines inside `targets` are
    /// wanted. The rest of `context` is parsed for multi-line state and its
    /// results are not kept. `targets` is clipped to `context`.
    pub fn request_within(
        &mut self,
        result: &DiffResult,
        context: Range<usize>,
        targets: Range<usize>,
    ) -> usize {
        let end = context.end.min(result.lines.len());
        let start = context.start.min(end);
        if start == end || targets.start >= targets.end {
            return 0;
        }

        let multi_file = result
            .lines
            .iter()
            .filter(|line| line.kind == DiffLineKind::FileHeader)
            .nth(1)
            .is_some();
        let mut language = result.lines[..start]
            .iter()
            .rev()
            .find(|line| line.kind == DiffLineKind::FileHeader)
            .map_or_else(
                || base_language(result),
                |header| segment_language(result, header, multi_file),
            );

        let mut documents = Vec::new();
        let mut segment = SegmentDocuments::new(language.clone());

        for (index, line) in result.lines.iter().enumerate().take(end).skip(start) {
            match line.kind {
                DiffLineKind::FileHeader => {
                    segment.flush_into(&mut documents);
                    language = segment_language(result, line, multi_file);
                    segment = SegmentDocuments::new(language.clone());
                }
                DiffLineKind::Spacer => {
                    segment.flush_into(&mut documents);
                    segment = SegmentDocuments::new(language.clone());
                }
                _ => {
                    let Some(lang) = language.as_deref() else {
                        continue;
                    };
                    let wanted = targets.contains(&index)
                        && !self.colors.contains_key(&line.id)
                        && !self.requested.contains(&line.id)
                        && !self.adopt_shared(line, lang);
                    segment.push(line, wanted);
                }
            }
        }
        segment.flush_into(&mut documents);

        let targets: Vec<LineId> = documents
            .iter()
            .flat_map(|doc| doc.targets.iter().flatten().copied())
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let job = HighlightJob {
            generation: self.generation,
            is_dark: self.is_dark,
            overlap_threshold: self.overlap_threshold,
            documents,
        };
        if !spawn_job(job, self.tx.clone()) {
            return 0;
        }

        self.in_flight += 1;
        self.requested.extend(targets.iter().copied());
        log::debug!(
            target: "syntax",
            "dispatched {} lines (generation {})",
            targets.len(),
            self.generation
        );
        targets.len()
    }

    fn adopt_shared(&mut self, line: &DiffLine, language: &str) -> bool {
        let key = SharedKey::new(line.content.clone(), language, self.is_dark);
        match self.shared.get(&key) {
            Some(hit) => {
                self.tokens.insert(line.id, hit.tokens.clone());
                self.colors.insert(line.id, hit.colors.clone());
                true
            }
            None => false,
        }
    }

    /// Apply every batch that has arrived. Returns true when any colors
    /// changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(batch) = self.rx.try_recv() {
            changed |= self.apply(batch);
        }
        changed
    }

    /// Block until every in-flight job has reported or `timeout` passes.
    pub fn wait_for_pending(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut changed = false;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(batch) => changed |= self.apply(batch),
                Err(_) => break,
            }
        }
        changed
    }

    fn apply(&mut self, batch: HighlightBatch) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if batch.generation != self.generation {
            log::trace!(
                target: "syntax",
                "dropping batch from generation {} (current {})",
                batch.generation,
                self.generation
            );
            return false;
        }

        let changed = !batch.lines.is_empty();
        for line in batch.lines {
            self.requested.remove(&line.id);
            self.tokens.insert(line.id, line.highlight.tokens.clone());
            self.colors.insert(line.id, line.highlight.colors.clone());
            self.shared.insert(
                SharedKey {
                    text: line.text,
                    language: line.language,
                    is_dark: batch.is_dark,
                },
                line.highlight,
            );
        }
        changed
    }

    /// Once either cache holds more than `ceiling` lines, keep only the
    /// lines of `result` inside `keep`. Returns how many entries were
    /// dropped.
    pub fn trim(&mut self, result: &DiffResult, keep: Range<usize>, ceiling: usize) -> usize {
        if self.tokens.len() <= ceiling && self.colors.len() <= ceiling {
            return 0;
        }
        let end = keep.end.min(result.lines.len());
        let start = keep.start.min(end);
        let retained: HashSet<LineId> = result.lines[start..end].iter().map(|l| l.id).collect();

        let before = self.colors.len();
        self.tokens.retain(|id, _| retained.contains(id));
        self.colors.retain(|id, _| retained.contains(id));
        let dropped = before - self.colors.len();
        log::debug!(target: "syntax", "trimmed {dropped} highlighted lines, kept {}", self.colors.len());
        dropped
    }
}

fn base_language(result: &DiffResult) -> Option<Arc<str>> {
    result.language.as_deref().map(Arc::from)
}

/// Multi-file results take each file's language from its name; a single
/// file keeps the result's (possibly explicit) language.
fn segment_language(result: &DiffResult, header: &DiffLine, multi_file: bool) -> Option<Arc<str>> {
    let from_name = || -> Option<Arc<str>> {
        header
            .file_meta
            .as_ref()
            .and_then(|meta| detect_language(&meta.filename))
            .map(Arc::from)
    };
    if multi_file {
        from_name().or_else(|| base_language(result))
    } else {
        base_language(result).or_else(from_name)
    }
}

/// Old and new side documents of one file segment.
struct SegmentDocuments {
    old: Option<HighlightDocument>,
    new: Option<HighlightDocument>,
}

impl SegmentDocuments {
    fn new(language: Option<Arc<str>>) -> Self {
        Self {
            old: language.clone().map(HighlightDocument::new),
            new: language.map(HighlightDocument::new),
        }
    }

    /// Common lines are taken from the new side only; on the old side they
    /// are context.
    fn push(&mut self, line: &DiffLine, wanted: bool) {
        if line.kind.in_source()
            && let Some(old) = self.old.as_mut()
        {
            let target = (wanted && line.kind == DiffLineKind::Removed).then_some(line.id);
            old.push(line.content.clone(), target);
        }
        if line.kind.in_target()
            && let Some(new) = self.new.as_mut()
        {
            new.push(line.content.clone(), wanted.then_some(line.id));
        }
    }

    fn flush_into(&mut self, documents: &mut Vec<HighlightDocument>) {
        for doc in [self.old.take(), self.new.take()].into_iter().flatten() {
            if doc.has_targets() {
                documents.push(doc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::diff::{diff, from_patches};

    const WAIT: Duration = Duration::from_secs(10);

    fn rust_diff(old: &str, new: &str) -> DiffResult {
        let mut result = diff(old, new);
        result.language = Some("rust".to_string());
        result
    }

    fn coordinator() -> SyntaxCoordinator {
        SyntaxCoordinator::new(SharedSyntaxCache::new(64), true, DEFAULT_OVERLAP_THRESHOLD)
    }

    #[test]
    fn highlights_both_sides() {
        let result = rust_diff("fn a() {}\nlet x = 1;\n", "fn a() {}\nlet y = 2;\n");
        let mut syntax = coordinator();
        assert_eq!(syntax.request(&result, 0..result.line_count()), 3);
        assert!(syntax.wait_for_pending(WAIT));
        for line in &result.lines {
            let colors = syntax.colors(line.id).unwrap();
            assert_eq!(colors.len(), line.char_len());
        }
        // Nothing left to send.
        assert_eq!(syntax.request(&result, 0..result.line_count()), 0);
    }

    #[test]
    fn no_language_means_no_work() {
        let result = diff("a\n", "b\n");
        let mut syntax = coordinator();
        assert_eq!(syntax.request(&result, 0..2), 0);
        assert_eq!(syntax.in_flight(), 0);
    }

    #[test]
    fn shared_cache_hits_skip_the_worker() {
        let shared = SharedSyntaxCache::new(64);
        let first = rust_diff("", "fn main() {}\n");
        let mut a = SyntaxCoordinator::new(shared.clone(), true, 0.5);
        a.request(&first, 0..1);
        a.wait_for_pending(WAIT);

        let second = rust_diff("", "fn main() {}\n");
        let mut b = SyntaxCoordinator::new(shared, true, 0.5);
        assert_eq!(b.request(&second, 0..1), 0);
        assert!(b.colors(second.lines[0].id).is_some());
    }

    #[test]
    fn appearance_change_discards_in_flight_results() {
        let result = rust_diff("", "let x = \"s\";\n");
        let id = result.lines[0].id;
        let mut syntax = coordinator();
        syntax.request(&result, 0..1);

        assert!(syntax.set_appearance(false));
        assert!(!syntax.set_appearance(false));
        syntax.wait_for_pending(WAIT);
        assert!(syntax.colors(id).is_none());

        syntax.request(&result, 0..1);
        syntax.wait_for_pending(WAIT);
        let colors = syntax.colors(id).unwrap();
        assert!(colors.contains(&crate::ui::diff::theme::Palette::light().syntax_string));
    }

    #[test]
    fn multi_file_segments_use_their_own_language() {
        let py = crate::infra::diff::from_patch(
            "--- a/x.py\n+++ b/x.py\n@@ -0,0 +1 @@\n+def f(): pass\n",
            None,
            None,
        );
        let rs = crate::infra::diff::from_patch(
            "--- a/y.rs\n+++ b/y.rs\n@@ -0,0 +1 @@\n+fn f() {}\n",
            None,
            None,
        );
        let combined = from_patches([rs, py], 1);
        let def_line = combined
            .lines
            .iter()
            .find(|l| l.content.as_ref() == "def f(): pass")
            .unwrap()
            .clone();

        let mut syntax = coordinator();
        syntax.request(&combined, 0..combined.line_count());
        syntax.wait_for_pending(WAIT);
        let tokens = syntax.tokens(def_line.id).unwrap();
        assert!(tokens.iter().any(|t| t.category == ScopeCategory::Keyword && t.range == (0..3)));
    }

    #[test]
    fn context_lines_carry_state_without_being_kept() {
        let text = "/* opened\nstill inside */\nlet x = 1;\n";
        let result = rust_diff(text, text);
        let mut syntax = coordinator();
        assert_eq!(syntax.request_within(&result, 0..3, 1..2), 1);
        assert!(syntax.wait_for_pending(WAIT));

        assert_eq!(syntax.cached_lines(), 1);
        assert!(syntax.colors(result.lines[0].id).is_none());
        // The opening line is never kept, yet it still makes this one a comment.
        let comment = crate::ui::diff::theme::Palette::dark().syntax_comment;
        let colors = syntax.colors(result.lines[1].id).unwrap();
        assert!(colors.iter().all(|c| *c == comment));
    }

    #[test]
    fn trim_keeps_only_the_requested_window() {
        let old: String = (0..40).map(|i| format!("let a{i} = {i};\n")).collect();
        let result = rust_diff(&old, &old);
        let mut syntax = coordinator();
        syntax.request(&result, 0..40);
        syntax.wait_for_pending(WAIT);
        assert_eq!(syntax.cached_lines(), 40);

        assert_eq!(syntax.trim(&result, 0..10, 100), 0);
        assert_eq!(syntax.trim(&result, 10..20, 20), 30);
        assert!(syntax.colors(result.lines[15].id).is_some());
        assert!(syntax.colors(result.lines[5].id).is_none());
    }
}

//! Background highlight jobs.
//!
//! A job owns copies of everything it reads, so the worker never touches the
//! coordinator's caches. Results travel back over a channel and are applied
//! by the owner thread.

use super::parser::highlight_document;
use super::shared_cache::LineHighlight;
use super::tokens::paint_colors;
use crate::domain::LineId;
use crate::ui::diff::theme::Palette;
use std::sync::Arc;
use std::sync::mpsc::Sender;

/// One side of one file segment, highlighted as a single document.
#[derive(Debug, Clone, Default)]
pub struct HighlightDocument {
    pub language: Arc<str>,
    pub lines: Vec<Arc<str>>,
    /// Parallel to `lines`. `None` marks context-only lines whose result
    /// is not wanted from this document.
    pub targets: Vec<Option<LineId>>,
}

impl HighlightDocument {
    pub fn new(language: Arc<str>) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn push(&mut self, content: Arc<str>, target: Option<LineId>) {
        self.lines.push(content);
        self.targets.push(target);
    }

    pub fn has_targets(&self) -> bool {
        self.targets.iter().any(Option::is_some)
    }
}

#[derive(Debug, Clone)]
pub struct HighlightJob {
    pub generation: u64,
    pub is_dark: bool,
    pub overlap_threshold: f32,
    pub documents: Vec<HighlightDocument>,
}

#[derive(Debug, Clone)]
pub struct HighlightedLine {
    pub id: LineId,
    pub text: Arc<str>,
    pub language: Arc<str>,
    pub highlight: Arc<LineHighlight>,
}

#[derive(Debug, Clone)]
pub struct HighlightBatch {
    pub generation: u64,
    pub is_dark: bool,
    pub lines: Vec<HighlightedLine>,
}

impl HighlightJob {
    pub fn run(self) -> HighlightBatch {
        let palette = Palette::for_mode(self.is_dark);
        let mut lines = Vec::new();

        for document in &self.documents {
            let tokens = highlight_document(&document.lines, &document.language, self.overlap_threshold);
            for ((text, target), tokens) in document.lines.iter().zip(&document.targets).zip(tokens)
            {
                let Some(id) = target else {
                    continue;
                };
                let colors = paint_colors(&tokens, text.chars().count(), &palette);
                lines.push(HighlightedLine {
                    id: *id,
                    text: text.clone(),
                    language: document.language.clone(),
                    highlight: Arc::new(LineHighlight {
                        tokens: Arc::from(tokens),
                        colors: Arc::from(colors),
                    }),
                });
            }
        }

        HighlightBatch {
            generation: self.generation,
            is_dark: self.is_dark,
            lines,
        }
    }
}

/// Run `job` on a new thread and send the batch to `tx`. Returns false if
/// the thread could not be started.
pub fn spawn_job(job: HighlightJob, tx: Sender<HighlightBatch>) -> bool {
    let spawned = std::thread::Builder::new()
        .name("diffsurface-syntax".to_string())
        .spawn(move || {
            let batch = job.run();
            // The coordinator may be gone; nothing to do then.
            let _ = tx.send(batch);
        });

    match spawned {
        Ok(_) => true,
        Err(err) => {
            log::warn!(target: "syntax", "failed to start highlight worker: {err}");
            false
        }
    }
}

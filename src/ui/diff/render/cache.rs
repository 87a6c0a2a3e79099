//! Render-cache controller: turns a diff session plus viewport into GPU
//! instance lists, reusing the last list whenever it still covers what is
//! on screen.

use super::row::{RowGeometry, RowPainter};
use super::selection::Selection;
use super::types::{Frame, FramePath, InstanceList, RenderStats, Vec2};
use crate::domain::DiffResult;
use crate::infra::app_config::ViewConfig;
use crate::infra::hash::Fingerprint;
use crate::ui::diff::glyph::{GlyphSource, MonospaceGlyphs};
use crate::ui::diff::layout::LayoutManager;
use crate::ui::diff::syntax::{SharedSyntaxCache, SyntaxCoordinator};
use crate::ui::diff::theme::Palette;
use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// No instance list cached.
    Empty,
    /// An instance list is cached and was just rebuilt.
    Populated,
    /// The last frame reused the cached list.
    ScrollOnly,
    Regenerating,
}

struct CachedInstances {
    /// Buffered row range the list was built for.
    range: Range<usize>,
    fingerprint: u64,
    instances: Arc<InstanceList>,
}

pub struct RenderCacheController {
    config: ViewConfig,
    session: Uuid,
    content: Arc<DiffResult>,
    layout: LayoutManager,
    glyphs: Box<dyn GlyphSource>,
    syntax: SyntaxCoordinator,
    palette: Palette,
    viewport: Vec2,
    scroll: Vec2,
    selection: Option<Selection>,
    selection_dirty: bool,
    needs_full_regen: bool,
    pending_clamp: bool,
    cached: Option<CachedInstances>,
    state: CacheState,
    stats: RenderStats,
}

impl RenderCacheController {
    /// Controller using the process-wide shared highlight cache and the
    /// built-in monospace metrics.
    pub fn new(config: ViewConfig) -> Self {
        Self::with_parts(
            config,
            SharedSyntaxCache::global(),
            Box::new(MonospaceGlyphs::default()),
        )
    }

    pub fn with_parts(
        config: ViewConfig,
        shared: SharedSyntaxCache,
        glyphs: Box<dyn GlyphSource>,
    ) -> Self {
        let palette = Palette::for_mode(config.dark_mode);
        let syntax = SyntaxCoordinator::new(shared, config.dark_mode, config.overlap_threshold);
        let layout = LayoutManager::new(0, glyphs.line_height());
        Self {
            config,
            session: Uuid::new_v4(),
            content: Arc::new(DiffResult::default()),
            layout,
            glyphs,
            syntax,
            palette,
            viewport: Vec2::ZERO,
            scroll: Vec2::ZERO,
            selection: None,
            selection_dirty: false,
            needs_full_regen: true,
            pending_clamp: false,
            cached: None,
            state: CacheState::Empty,
            stats: RenderStats::default(),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn content(&self) -> &Arc<DiffResult> {
        &self.content
    }

    pub fn session_id(&self) -> Uuid {
        self.session
    }

    pub fn layout(&self) -> &LayoutManager {
        &self.layout
    }

    pub fn syntax(&self) -> &SyntaxCoordinator {
        &self.syntax
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn needs_full_regen(&self) -> bool {
        self.needs_full_regen
    }

    pub fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Start a new session on `content`. Every cache tier is dropped.
    pub fn set_content(&mut self, content: Arc<DiffResult>) {
        self.session = Uuid::new_v4();
        self.content = content;
        self.layout
            .rebuild(self.content.line_count(), self.glyphs.line_height());
        self.syntax.reset();
        self.selection = None;
        self.invalidate_all("content replaced");
    }

    pub fn set_glyph_source(&mut self, glyphs: Box<dyn GlyphSource>) {
        self.glyphs = glyphs;
        self.layout
            .rebuild(self.content.line_count(), self.glyphs.line_height());
        self.invalidate_all("font changed");
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(0.0), height.max(0.0));
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.scroll.y = y.max(0.0);
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_to(self.scroll.y + dy);
    }

    pub fn set_horizontal_scroll(&mut self, x: f32) {
        self.scroll.x = x.max(0.0);
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        if self.selection != selection {
            self.selection = selection;
            self.selection_dirty = true;
        }
    }

    pub fn set_appearance(&mut self, is_dark: bool) {
        if self.syntax.set_appearance(is_dark) {
            self.config.dark_mode = is_dark;
            self.palette = Palette::for_mode(is_dark);
            self.cached = None;
            self.needs_full_regen = true;
        }
    }

    fn invalidate_all(&mut self, reason: &str) {
        log::debug!(target: "render", "full invalidation: {reason}");
        self.cached = None;
        self.needs_full_regen = true;
        self.selection_dirty = false;
        self.state = CacheState::Empty;
    }

    /// Apply finished highlight jobs. New colors only invalidate the
    /// instance list.
    pub fn poll_highlights(&mut self) -> bool {
        let changed = self.syntax.poll();
        if changed {
            self.cached = None;
        }
        changed
    }

    /// Block until in-flight highlight jobs report, up to `timeout`.
    pub fn wait_for_highlights(&mut self, timeout: Duration) -> bool {
        let changed = self.syntax.wait_for_pending(timeout);
        if changed {
            self.cached = None;
        }
        changed
    }

    fn fingerprint(&self) -> u64 {
        Fingerprint::new()
            .add(&self.session)
            .add(&self.selection.map(|s| s.normalized()))
            .add_f32(self.scroll.x)
            .add_f32(self.viewport.x)
            .add(&self.palette.is_dark)
            .finish()
    }

    pub fn frame(&mut self) -> Frame {
        self.poll_highlights();

        if self.pending_clamp {
            self.scroll.y = self.scroll.y.min(self.layout.max_scroll(self.viewport.y)).max(0.0);
            self.pending_clamp = false;
        }

        let top = self.scroll.y;
        let bottom = top + self.viewport.y;
        let camera_offset = Vec2::new(0.0, top);
        let visible = self.layout.visible_range(top, bottom, 0);

        // An unsized viewport shows nothing even though the layout would
        // report the line under it.
        if self.viewport.y <= 0.0 || visible.is_empty() {
            self.stats.empty_frames += 1;
            self.pending_clamp = true;
            return Frame {
                instances: Arc::new(InstanceList::default()),
                camera_offset,
                visible,
                path: FramePath::Empty,
            };
        }

        let fingerprint = self.fingerprint();
        if let Some(cached) = &self.cached
            && !self.needs_full_regen
            && !self.selection_dirty
            && cached.fingerprint == fingerprint
            && cached.range.start <= visible.start
            && visible.end <= cached.range.end
        {
            self.stats.reuses += 1;
            self.state = CacheState::ScrollOnly;
            return Frame {
                instances: cached.instances.clone(),
                camera_offset,
                visible,
                path: FramePath::Reused,
            };
        }

        let instances = self.regenerate(top, bottom, &visible, fingerprint);
        Frame {
            instances,
            camera_offset,
            visible,
            path: FramePath::Regenerated,
        }
    }

    fn regenerate(
        &mut self,
        top: f32,
        bottom: f32,
        visible: &Range<usize>,
        fingerprint: u64,
    ) -> Arc<InstanceList> {
        self.state = CacheState::Regenerating;
        let content = self.content.clone();
        let count = content.line_count();
        let buffered = self.layout.visible_range(top, bottom, self.config.buffer_rows);

        // Lines that survive a trim. Results outside it would be dropped
        // again by the trim below, so they are parsed as context only.
        let retained = visible
            .start
            .saturating_sub(self.config.trim_buffer)
            .min(buffered.start)
            ..(visible.end + self.config.trim_buffer)
                .min(count)
                .max(buffered.end);
        let context = if count <= self.config.whole_document_highlight_limit {
            0..count
        } else {
            buffered.start.saturating_sub(self.config.highlight_lookaround)
                ..(buffered.end + self.config.highlight_lookaround).min(count)
        };
        let targets = if context.len() <= self.config.trim_ceiling {
            context.clone()
        } else {
            retained.clone()
        };
        self.syntax.request_within(&content, context, targets);

        let geometry = RowGeometry {
            viewport_width: self.viewport.x,
            line_height: self.layout.line_height(),
            advance: self.glyphs.advance(),
            gutter_chars: self.config.gutter_chars,
            text_padding: self.config.text_padding,
            scroll_x: self.scroll.x,
        };

        let mut list = InstanceList::default();
        let mut painter = RowPainter {
            list: &mut list,
            glyphs: self.glyphs.as_ref(),
            palette: &self.palette,
            geometry,
        };
        for index in buffered.clone() {
            let line = &content.lines[index];
            let selected = self
                .selection
                .and_then(|s| s.columns_on_line(index, line.char_len()));
            painter.paint(
                line,
                self.layout.line_y(index),
                self.syntax.colors(line.id),
                selected,
            );
        }

        let instances = Arc::new(list);
        log::debug!(
            target: "render",
            "regenerated rows {:?}: {} rects, {} glyphs",
            buffered,
            instances.rects.len(),
            instances.glyphs.len()
        );
        self.cached = Some(CachedInstances {
            range: buffered,
            fingerprint,
            instances: instances.clone(),
        });
        self.needs_full_regen = false;
        self.selection_dirty = false;
        self.stats.regenerations += 1;

        self.syntax
            .trim(&content, retained, self.config.trim_ceiling);

        self.state = CacheState::Populated;
        instances
    }
}

//! Instance emission for one diff row.

use super::types::{Color, GlyphInstance, InstanceList, RectInstance, Vec2};
use crate::domain::{DiffLine, DiffLineKind, FileMeta};
use crate::ui::diff::glyph::GlyphSource;
use crate::ui::diff::theme::Palette;
use std::ops::Range;

const HEADER_CORNER_RADIUS: f32 = 3.0;
const HEADER_BORDER_WIDTH: f32 = 1.0;

/// Horizontal layout shared by every row of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGeometry {
    pub viewport_width: f32,
    pub line_height: f32,
    pub advance: f32,
    pub gutter_chars: usize,
    pub text_padding: f32,
    /// Horizontal scroll of the text section. The gutter never scrolls.
    pub scroll_x: f32,
}

impl RowGeometry {
    pub fn gutter_width(&self) -> f32 {
        self.gutter_chars as f32 * self.advance
    }

    pub fn text_origin_x(&self) -> f32 {
        self.gutter_width() + self.text_padding
    }

    /// Left edge of character column `column` in the scrolled text section.
    pub fn column_x(&self, column: usize) -> f32 {
        self.text_origin_x() - self.scroll_x + column as f32 * self.advance
    }

    /// `[start, end)` columns as pixels, clipped to the visible text
    /// section. `None` when nothing of the span is visible.
    pub fn span_x(&self, columns: &Range<usize>) -> Option<(f32, f32)> {
        let left = self.column_x(columns.start).max(self.gutter_width());
        let right = self.column_x(columns.end).min(self.viewport_width);
        (left < right).then_some((left, right))
    }
}

pub struct RowPainter<'a> {
    pub list: &'a mut InstanceList,
    pub glyphs: &'a dyn GlyphSource,
    pub palette: &'a Palette,
    pub geometry: RowGeometry,
}

impl RowPainter<'_> {
    pub fn paint(
        &mut self,
        line: &DiffLine,
        y: f32,
        colors: Option<&[Color]>,
        selection: Option<Range<usize>>,
    ) {
        match line.kind {
            DiffLineKind::FileHeader => self.paint_header(line, y),
            DiffLineKind::Spacer => {}
            DiffLineKind::Common | DiffLineKind::Added | DiffLineKind::Removed => {
                self.paint_code(line, y, colors, selection)
            }
        }
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, color: Color) {
        self.list.rects.push(RectInstance::new(
            Vec2::new(x, y),
            Vec2::new(width, self.geometry.line_height),
            color,
        ));
    }

    fn paint_code(
        &mut self,
        line: &DiffLine,
        y: f32,
        colors: Option<&[Color]>,
        selection: Option<Range<usize>>,
    ) {
        let geo = self.geometry;
        let palette = *self.palette;

        self.rect(0.0, y, geo.gutter_width(), palette.gutter_bg);

        let (tint, change_tint) = match line.kind {
            DiffLineKind::Added => (Some(palette.added_bg), palette.added_change_bg),
            DiffLineKind::Removed => (Some(palette.removed_bg), palette.removed_change_bg),
            _ => (None, palette.added_change_bg),
        };
        if let Some(tint) = tint {
            self.rect(0.0, y, geo.viewport_width, tint);
        }

        if let Some(ranges) = &line.changed_ranges {
            for range in ranges {
                if let Some((left, right)) = geo.span_x(range) {
                    self.rect(left, y, right - left, change_tint);
                }
            }
        }

        if let Some(columns) = selection
            && let Some((left, right)) = geo.span_x(&columns)
        {
            self.rect(left, y, right - left, palette.selection_bg);
        }

        self.paint_gutter_numbers(line, y);

        for (column, ch) in line.content.chars().enumerate() {
            let x = geo.column_x(column);
            if x < geo.gutter_width() {
                continue;
            }
            if x >= geo.viewport_width {
                break;
            }
            let color = colors
                .and_then(|c| c.get(column))
                .copied()
                .unwrap_or(palette.text_default);
            self.glyph(ch, x, y, color);
        }
    }

    fn paint_gutter_numbers(&mut self, line: &DiffLine, y: f32) {
        let geo = self.geometry;
        let half = geo.gutter_chars / 2;
        let color = self.palette.gutter_text;

        // Right-aligned in each half, one column of padding on the right.
        let columns = [(line.original_line_number, half), (line.new_line_number, geo.gutter_chars)];
        for (number, right_edge) in columns {
            let Some(number) = number else {
                continue;
            };
            let text = number.to_string();
            let width = text.chars().count();
            let start = right_edge.saturating_sub(width + 1);
            let mut x = start as f32 * geo.advance;
            for ch in text.chars() {
                self.glyph(ch, x, y, color);
                x += geo.advance;
            }
        }
    }

    fn paint_header(&mut self, line: &DiffLine, y: f32) {
        let geo = self.geometry;
        let palette = *self.palette;

        self.list.rects.push(
            RectInstance::new(
                Vec2::new(0.0, y),
                Vec2::new(geo.viewport_width, geo.line_height),
                palette.header_bg,
            )
            .rounded(HEADER_CORNER_RADIUS)
            .bordered(HEADER_BORDER_WIDTH, palette.header_border),
        );

        let meta = line.file_meta.clone().unwrap_or_else(|| FileMeta {
            filename: line.content.to_string(),
            ..FileMeta::default()
        });

        let mut x = geo.text_origin_x();
        x = self.text(&meta.filename, x, y, palette.header_text);
        x += geo.advance * 2.0;
        x = self.text(&format!("+{}", meta.lines_added), x, y, palette.stat_added);
        x += geo.advance;
        self.text(&format!("-{}", meta.lines_removed), x, y, palette.stat_removed);
    }

    /// Unscrolled text, clipped at the viewport edge. Returns the x after
    /// the last character.
    fn text(&mut self, text: &str, mut x: f32, y: f32, color: Color) -> f32 {
        for ch in text.chars() {
            if x < self.geometry.viewport_width {
                self.glyph(ch, x, y, color);
            }
            x += self.geometry.advance;
        }
        x
    }

    fn glyph(&mut self, ch: char, x: f32, y: f32, color: Color) {
        let Some(metrics) = self.glyphs.glyph(ch) else {
            return;
        };
        let top = y + (self.geometry.line_height - metrics.size.y) / 2.0;
        self.list.glyphs.push(GlyphInstance {
            origin: Vec2::new(x, top),
            size: metrics.size,
            uv_min: metrics.uv_min,
            uv_max: metrics.uv_max,
            color,
        });
    }
}

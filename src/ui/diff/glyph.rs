//! Character to glyph lookup seam.
//!
//! The render controller only consumes glyph metrics; rasterization and the
//! atlas texture belong to the backend.

use super::render::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub size: Vec2,
    pub advance: f32,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

pub trait GlyphSource {
    /// Metrics for `ch`, or `None` when the font has nothing to draw.
    fn glyph(&self, ch: char) -> Option<GlyphMetrics>;

    /// Fixed horizontal advance shared by every character.
    fn advance(&self) -> f32;

    fn line_height(&self) -> f32;
}

const ATLAS_FIRST: u32 = 0x20;
const ATLAS_LAST: u32 = 0x7e;

/// Monospace font backed by a grid atlas of printable ASCII. Characters
/// outside the atlas map to the `?` cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceGlyphs {
    pub advance: f32,
    pub line_height: f32,
    pub glyph_size: Vec2,
    pub atlas_columns: u32,
}

impl Default for MonospaceGlyphs {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 18.0,
            glyph_size: Vec2::new(8.0, 14.0),
            atlas_columns: 16,
        }
    }
}

impl MonospaceGlyphs {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
            glyph_size: Vec2::new(advance, (line_height * 0.78).round()),
            ..Self::default()
        }
    }

    fn atlas_rows(&self) -> u32 {
        let cells = ATLAS_LAST - ATLAS_FIRST + 1;
        cells.div_ceil(self.atlas_columns.max(1))
    }

    fn cell(&self, ch: char) -> u32 {
        let code = ch as u32;
        if (ATLAS_FIRST..=ATLAS_LAST).contains(&code) {
            code - ATLAS_FIRST
        } else {
            '?' as u32 - ATLAS_FIRST
        }
    }
}

impl GlyphSource for MonospaceGlyphs {
    fn glyph(&self, ch: char) -> Option<GlyphMetrics> {
        if ch.is_whitespace() || ch.is_control() {
            return None;
        }
        let columns = self.atlas_columns.max(1);
        let rows = self.atlas_rows();
        let cell = self.cell(ch);
        let (col, row) = (cell % columns, cell / columns);

        let du = 1.0 / columns as f32;
        let dv = 1.0 / rows as f32;
        Some(GlyphMetrics {
            size: self.glyph_size,
            advance: self.advance,
            uv_min: Vec2::new(col as f32 * du, row as f32 * dv),
            uv_max: Vec2::new((col + 1) as f32 * du, (row + 1) as f32 * dv),
        })
    }

    fn advance(&self) -> f32 {
        self.advance
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_has_no_glyph() {
        let glyphs = MonospaceGlyphs::default();
        assert!(glyphs.glyph(' ').is_none());
        assert!(glyphs.glyph('\t').is_none());
        assert!(glyphs.glyph('a').is_some());
    }

    #[test]
    fn uv_rects_stay_inside_the_atlas() {
        let glyphs = MonospaceGlyphs::default();
        for ch in ['!', 'A', 'z', '~', 'é'] {
            let m = glyphs.glyph(ch).unwrap();
            assert!(m.uv_min.x >= 0.0 && m.uv_max.x <= 1.0, "{ch}");
            assert!(m.uv_min.y >= 0.0 && m.uv_max.y <= 1.0, "{ch}");
            assert!(m.uv_min.x < m.uv_max.x);
        }
    }

    #[test]
    fn non_ascii_maps_to_replacement_cell() {
        let glyphs = MonospaceGlyphs::default();
        assert_eq!(glyphs.glyph('é'), glyphs.glyph('?'));
    }
}

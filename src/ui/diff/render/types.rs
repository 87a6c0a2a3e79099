use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::from_rgba(0, 0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

/// Background rectangle descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectInstance {
    pub origin: Vec2,
    pub size: Vec2,
    pub color: Color,
    pub corner_radius: f32,
    pub border: Option<Border>,
}

impl RectInstance {
    pub fn new(origin: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            origin,
            size,
            color,
            corner_radius: 0.0,
            border: None,
        }
    }

    pub fn rounded(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn bordered(mut self, width: f32, color: Color) -> Self {
        self.border = Some(Border { width, color });
        self
    }
}

/// Textured glyph quad descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlyphInstance {
    pub origin: Vec2,
    pub size: Vec2,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    pub color: Color,
}

/// Everything drawn for one cached range, in paint order: rectangles
/// first, glyphs on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstanceList {
    pub rects: Vec<RectInstance>,
    pub glyphs: Vec<GlyphInstance>,
}

impl InstanceList {
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.glyphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len() + self.glyphs.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePath {
    /// The cached instance list was handed back unchanged.
    Reused,
    Regenerated,
    /// Nothing visible; no instances.
    Empty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub regenerations: u64,
    pub reuses: u64,
    pub empty_frames: u64,
}

/// One paint's worth of output for the GPU backend.
#[derive(Debug, Clone)]
pub struct Frame {
    pub instances: Arc<InstanceList>,
    /// Instances are laid out in document space; the backend translates by
    /// minus this offset.
    pub camera_offset: Vec2,
    pub visible: Range<usize>,
    pub path: FramePath,
}

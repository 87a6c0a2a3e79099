//! Diff view session machinery: layout, highlighting and render caching.

pub mod glyph;
pub mod layout;
pub mod render;
pub mod syntax;
pub mod theme;

pub use glyph::{GlyphMetrics, GlyphSource, MonospaceGlyphs};
pub use layout::LayoutManager;
pub use render::{Frame, FramePath, RenderCacheController, RenderStats, Selection, TextPosition};
pub use syntax::{SharedSyntaxCache, StyledToken, SyntaxCoordinator};
pub use theme::Palette;

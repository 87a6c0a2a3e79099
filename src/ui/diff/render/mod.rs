//! GPU instance generation with a reuse-first cache.

pub mod cache;
pub mod row;
pub mod selection;
pub mod types;

pub use cache::{CacheState, RenderCacheController};
pub use row::RowGeometry;
pub use selection::{Selection, TextPosition};
pub use types::{
    Border, Color, Frame, FramePath, GlyphInstance, InstanceList, RectInstance, RenderStats, Vec2,
};

//! Diff computation, viewport virtualization and incremental render caches
//! for large diff views.

pub mod domain;
pub mod infra;
pub mod ui;

pub use domain::{DiffLine, DiffLineKind, DiffResult, LineId};
pub use infra::diff::{diff, diff_with_options, from_patch, from_patches};
pub use ui::diff::{LayoutManager, RenderCacheController, SyntaxCoordinator};

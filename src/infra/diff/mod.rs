//! Diff engine: text pairs and unified patches to classified line sequences.

pub mod engine;
pub mod inline;
pub mod language;
pub mod patch;

pub use engine::{DiffOptions, diff, diff_with_options, split_lines};
pub use inline::{InlineRanges, inline_ranges};
pub use language::{detect_language, resolve_language};
pub use patch::{
    DEFAULT_SPACER_LINES, from_multi_file_patch, from_patch, from_patches, split_patch_by_file,
};

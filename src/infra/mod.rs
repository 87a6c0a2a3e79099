//! Infrastructure layer.
//!
//! Pure computations over text (diffing, patch parsing, conflict scanning)
//! and process-level plumbing (hashing, configuration files).

pub mod app_config;
pub mod conflict;
pub mod diff;
pub mod hash;

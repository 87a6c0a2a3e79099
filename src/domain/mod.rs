//! Domain types for diffsurface.
//! Defines the immutable data produced by the diff engine and conflict scanner.

pub mod conflict;
pub mod diff;
pub mod error;

pub use conflict::*;
pub use diff::*;
pub use error::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_region_resolution_text() {
        let mut region = ConflictRegion {
            id: 0,
            start_line_index: 0,
            base_line_index: None,
            separator_line_index: 2,
            end_line_index: 4,
            ours_label: "HEAD".into(),
            theirs_label: "feature".into(),
            ours_text: "ours\n".into(),
            theirs_text: "theirs\n".into(),
            base_text: None,
            resolution: None,
        };
        assert!(!region.is_resolved());
        assert_eq!(region.resolved_text(), None);

        region.resolution = Some(ConflictResolution::Both);
        assert!(region.is_resolved());
        assert_eq!(region.resolved_text().as_deref(), Some("ours\ntheirs\n"));

        region.resolution = Some(ConflictResolution::Base);
        assert_eq!(region.resolved_text().as_deref(), Some(""));
    }

    #[test]
    fn test_line_kind_sides() {
        assert!(DiffLineKind::Common.in_source() && DiffLineKind::Common.in_target());
        assert!(!DiffLineKind::Added.in_source());
        assert!(!DiffLineKind::Removed.in_target());
        assert!(!DiffLineKind::Spacer.is_code());
        assert!(!DiffLineKind::FileHeader.is_code());
    }
}

use serde::{Deserialize, Serialize};

/// Which side of a merge conflict replaces the marker block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    Ours,
    Theirs,
    /// Ours followed by theirs.
    Both,
    /// The common ancestor, when the markers carried a `|||||||` section.
    Base,
}

/// One `<<<<<<<` .. `>>>>>>>` block, addressed by 0-based line indices into
/// the text it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRegion {
    pub id: usize,
    /// Line holding `<<<<<<<`.
    pub start_line_index: usize,
    /// Line holding `|||||||`, if the conflict was written in diff3 style.
    pub base_line_index: Option<usize>,
    /// Line holding `=======`.
    pub separator_line_index: usize,
    /// Line holding `>>>>>>>`.
    pub end_line_index: usize,
    pub ours_label: String,
    pub theirs_label: String,
    pub ours_text: String,
    pub theirs_text: String,
    pub base_text: Option<String>,
    pub resolution: Option<ConflictResolution>,
}

impl ConflictRegion {
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Text the region collapses to under its current resolution.
    pub fn resolved_text(&self) -> Option<String> {
        let resolution = self.resolution?;
        Some(match resolution {
            ConflictResolution::Ours => self.ours_text.clone(),
            ConflictResolution::Theirs => self.theirs_text.clone(),
            ConflictResolution::Both => format!("{}{}", self.ours_text, self.theirs_text),
            ConflictResolution::Base => self.base_text.clone().unwrap_or_default(),
        })
    }

    pub fn contains_line(&self, line_index: usize) -> bool {
        (self.start_line_index..=self.end_line_index).contains(&line_index)
    }
}

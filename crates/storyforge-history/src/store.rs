use tracing::debug;

use crate::types::{StoryContent, StoryVersion, VersionSummary};

/// Ordered history of snapshots for the current story session.
///
/// Index 0 is always the newest version. The store never compares content;
/// callers decide whether a snapshot is warranted.
#[derive(Debug, Default)]
pub struct VersionStore {
    versions: Vec<StoryVersion>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-copy `content` into a new version and put it at the front.
    pub fn save(&mut self, content: &StoryContent, label: impl Into<String>) -> &StoryVersion {
        let version = StoryVersion::capture(content, label.into());
        debug!(
            id = %version.id(),
            label = version.label(),
            total = self.versions.len() + 1,
            "Recorded story version"
        );
        self.versions.insert(0, version);
        &self.versions[0]
    }

    /// Look up a version by id.
    pub fn get(&self, id: &str) -> Option<&StoryVersion> {
        self.versions.iter().find(|v| v.id().as_str() == id)
    }

    /// Drop every version. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.versions.len();
        self.versions.clear();
        removed
    }

    /// All versions, newest first.
    pub fn versions(&self) -> &[StoryVersion] {
        &self.versions
    }

    pub fn latest(&self) -> Option<&StoryVersion> {
        self.versions.first()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Summaries for list views, newest first.
    pub fn summaries(&self) -> Vec<VersionSummary> {
        self.versions.iter().map(StoryVersion::summary).collect()
    }
}

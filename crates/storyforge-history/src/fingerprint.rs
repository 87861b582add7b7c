use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::StoryContent;

/// SHA-256 of the JSON serialization of a [`StoryContent`].
///
/// Equal fingerprints mean the serialized contents are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(content: &StoryContent) -> Self {
        // Plain strings, integers and JSON values always serialize.
        let bytes = serde_json::to_vec(content).expect("content serializes");
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_content_equal_fingerprint() {
        let a = StoryContent {
            title: "Checkout".into(),
            acceptance_criteria: vec!["pay".into()],
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_any_field_change_alters_fingerprint() {
        let base = StoryContent {
            title: "Checkout".into(),
            ..Default::default()
        };
        let mut pointed = base.clone();
        pointed.story_points = 3;
        let mut reordered = base.clone();
        reordered.acceptance_criteria = vec!["b".into(), "a".into()];

        assert_ne!(Fingerprint::of(&base), Fingerprint::of(&pointed));
        assert_ne!(Fingerprint::of(&base), Fingerprint::of(&reordered));
        assert_eq!(Fingerprint::of(&base).as_str().len(), 64);
    }

    #[test]
    fn test_short_never_panics() {
        let full = Fingerprint::of(&StoryContent::default());
        assert_eq!(full.short(), &full.as_str()[..8]);

        let truncated: Fingerprint = serde_json::from_str(r#""ab12""#).unwrap();
        assert_eq!(truncated.short(), "ab12");
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use storyforge_history::{StoryContent, StoryVersion, VersionId};

/// Comparison of a single-valued field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldChange<T> {
    Unchanged { value: T },
    /// `old` is the recorded value, `new` the current draft's
    Changed { old: T, new: T },
}

impl<T: PartialEq + Clone> FieldChange<T> {
    fn between(old: &T, new: &T) -> Self {
        if old == new {
            Self::Unchanged { value: new.clone() }
        } else {
            Self::Changed {
                old: old.clone(),
                new: new.clone(),
            }
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Value-based comparison of a list field.
///
/// Position is ignored: a reordered list with the same items is unchanged.
/// Duplicates are kept per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListDiff {
    /// Items of the recorded list also present in the draft
    pub unchanged: Vec<String>,
    /// Items only in the recorded list
    pub removed: Vec<String>,
    /// Items only in the draft
    pub added: Vec<String>,
}

impl ListDiff {
    fn between(old: &[String], new: &[String]) -> Self {
        let mut diff = ListDiff::default();
        for item in old {
            if new.contains(item) {
                diff.unchanged.push(item.clone());
            } else {
                diff.removed.push(item.clone());
            }
        }
        diff.added = new.iter().filter(|i| !old.contains(i)).cloned().collect();
        diff
    }

    pub fn is_changed(&self) -> bool {
        !self.removed.is_empty() || !self.added.is_empty()
    }
}

/// Counts of a diff, for logging and "changed" badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub fields_changed: usize,
    pub criteria_added: usize,
    pub criteria_removed: usize,
}

/// Per-field comparison of a recorded version against the working draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryDiff {
    pub version_id: VersionId,
    pub version_label: String,
    pub version_timestamp: DateTime<Utc>,
    pub title: FieldChange<String>,
    pub description: FieldChange<String>,
    pub acceptance_criteria: ListDiff,
    pub story_points: FieldChange<u32>,
    /// Present when either side carries test data
    pub edge_cases: Option<ListDiff>,
}

impl StoryDiff {
    /// Names of the fields that differ, in display order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_changed() {
            fields.push("title");
        }
        if self.description.is_changed() {
            fields.push("description");
        }
        if self.acceptance_criteria.is_changed() {
            fields.push("acceptance_criteria");
        }
        if self.story_points.is_changed() {
            fields.push("story_points");
        }
        if self.edge_cases.as_ref().is_some_and(ListDiff::is_changed) {
            fields.push("edge_cases");
        }
        fields
    }

    pub fn has_changes(&self) -> bool {
        !self.changed_fields().is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            fields_changed: self.changed_fields().len(),
            criteria_added: self.acceptance_criteria.added.len(),
            criteria_removed: self.acceptance_criteria.removed.len(),
        }
    }
}

/// Computes [`StoryDiff`]s. Never mutates either input.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    include_edge_cases: bool,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            include_edge_cases: true,
        }
    }

    pub fn with_edge_cases(mut self, include: bool) -> Self {
        self.include_edge_cases = include;
        self
    }

    /// Compare a recorded version (old side) with the current draft (new side).
    pub fn compare(&self, version: &StoryVersion, current: &StoryContent) -> StoryDiff {
        let recorded = version.content();

        let edge_cases = if self.include_edge_cases
            && (recorded.test_data.is_some() || current.test_data.is_some())
        {
            let empty = Vec::new();
            let old = recorded.test_data.as_ref().map_or(&empty, |t| &t.edge_cases);
            let new = current.test_data.as_ref().map_or(&empty, |t| &t.edge_cases);
            Some(ListDiff::between(old, new))
        } else {
            None
        };

        let diff = StoryDiff {
            version_id: version.id().clone(),
            version_label: version.label().to_string(),
            version_timestamp: version.timestamp(),
            title: FieldChange::between(&recorded.title, &current.title),
            description: FieldChange::between(&recorded.description, &current.description),
            acceptance_criteria: ListDiff::between(
                &recorded.acceptance_criteria,
                &current.acceptance_criteria,
            ),
            story_points: FieldChange::between(&recorded.story_points, &current.story_points),
            edge_cases,
        };

        debug!(
            version = %diff.version_id,
            changed = ?diff.changed_fields(),
            "Computed story diff"
        );

        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_history::{TestData, VersionStore};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn recorded(content: &StoryContent) -> StoryVersion {
        let mut store = VersionStore::new();
        let version = store.save(content, "Manual Save").clone();
        version
    }

    #[test]
    fn test_criteria_split_into_unchanged_removed_added() {
        let old = StoryContent {
            acceptance_criteria: strings(&["a", "b"]),
            ..Default::default()
        };
        let new = StoryContent {
            acceptance_criteria: strings(&["b", "c"]),
            ..Default::default()
        };

        let diff = DiffEngine::new().compare(&recorded(&old), &new);
        assert_eq!(diff.acceptance_criteria.unchanged, strings(&["b"]));
        assert_eq!(diff.acceptance_criteria.removed, strings(&["a"]));
        assert_eq!(diff.acceptance_criteria.added, strings(&["c"]));
        assert_eq!(diff.changed_fields(), vec!["acceptance_criteria"]);
    }

    #[test]
    fn test_reordered_criteria_are_unchanged() {
        let old = StoryContent {
            acceptance_criteria: strings(&["a", "b", "c"]),
            ..Default::default()
        };
        let new = StoryContent {
            acceptance_criteria: strings(&["c", "a", "b"]),
            ..Default::default()
        };

        let diff = DiffEngine::new().compare(&recorded(&old), &new);
        assert!(!diff.acceptance_criteria.is_changed());
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_text_fields_report_old_and_new() {
        let old = StoryContent {
            title: "Login".into(),
            description: "same".into(),
            ..Default::default()
        };
        let new = StoryContent {
            title: "Login with SSO".into(),
            description: "same".into(),
            ..Default::default()
        };

        let diff = DiffEngine::new().compare(&recorded(&old), &new);
        assert_eq!(
            diff.title,
            FieldChange::Changed {
                old: "Login".into(),
                new: "Login with SSO".into()
            }
        );
        assert_eq!(
            diff.description,
            FieldChange::Unchanged {
                value: "same".into()
            }
        );
    }

    #[test]
    fn test_story_points_scalar() {
        let old = StoryContent {
            story_points: 5,
            ..Default::default()
        };
        let mut new = old.clone();

        let unchanged = DiffEngine::new().compare(&recorded(&old), &new);
        assert_eq!(unchanged.story_points, FieldChange::Unchanged { value: 5 });

        new.story_points = 8;
        let changed = DiffEngine::new().compare(&recorded(&old), &new);
        assert_eq!(changed.story_points, FieldChange::Changed { old: 5, new: 8 });
        assert_eq!(changed.summary().fields_changed, 1);
    }

    #[test]
    fn test_edge_cases_only_when_test_data_present() {
        let bare = StoryContent::default();
        let diff = DiffEngine::new().compare(&recorded(&bare), &bare);
        assert!(diff.edge_cases.is_none());

        let with_data = StoryContent {
            test_data: Some(TestData {
                edge_cases: strings(&["timeout"]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let diff = DiffEngine::new().compare(&recorded(&bare), &with_data);
        let edge = diff.edge_cases.unwrap();
        assert_eq!(edge.added, strings(&["timeout"]));
        assert!(edge.removed.is_empty());

        let skipped = DiffEngine::new()
            .with_edge_cases(false)
            .compare(&recorded(&bare), &with_data);
        assert!(skipped.edge_cases.is_none());
    }

    #[test]
    fn test_default_engine_includes_edge_cases() {
        let with_data = StoryContent {
            test_data: Some(TestData {
                edge_cases: strings(&["expired link"]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let bare = StoryContent::default();
        let diff = DiffEngine::default().compare(&recorded(&bare), &with_data);
        assert_eq!(diff.edge_cases.unwrap().added, strings(&["expired link"]));
    }

    #[test]
    fn test_duplicates_kept_per_side() {
        let old = StoryContent {
            acceptance_criteria: strings(&["a", "a", "b"]),
            ..Default::default()
        };
        let new = StoryContent {
            acceptance_criteria: strings(&["a", "c", "c"]),
            ..Default::default()
        };

        let diff = DiffEngine::new().compare(&recorded(&old), &new);
        assert_eq!(diff.acceptance_criteria.unchanged, strings(&["a", "a"]));
        assert_eq!(diff.acceptance_criteria.removed, strings(&["b"]));
        assert_eq!(diff.acceptance_criteria.added, strings(&["c", "c"]));
    }

    #[test]
    fn test_compare_leaves_inputs_untouched() {
        let old = StoryContent {
            title: "a".into(),
            ..Default::default()
        };
        let new = StoryContent {
            title: "b".into(),
            ..Default::default()
        };
        let version = recorded(&old);
        let _ = DiffEngine::new().compare(&version, &new);
        assert_eq!(version.content(), &old);
        assert_eq!(new.title, "b");
    }
}

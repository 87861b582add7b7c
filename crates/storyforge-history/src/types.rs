use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const PREVIEW_LEN: usize = 60;

/// Test data attached to a story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestData {
    pub user_inputs: Vec<String>,
    pub edge_cases: Vec<String>,
    /// Opaque structured responses (status codes, payloads)
    pub api_responses: Vec<serde_json::Value>,
    pub code_snippets: Vec<String>,
}

/// The story being edited and versioned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryContent {
    pub title: String,
    pub description: String,
    /// Ordered; duplicates allowed
    pub acceptance_criteria: Vec<String>,
    pub story_points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data: Option<TestData>,
}

impl StoryContent {
    /// True when at least one of title, description or criteria carries text.
    pub fn has_meaningful_content(&self) -> bool {
        !self.title.trim().is_empty()
            || !self.description.trim().is_empty()
            || !self.acceptance_criteria.is_empty()
    }

    /// Mutable access to test data, creating an empty record if missing.
    pub fn test_data_mut(&mut self) -> &mut TestData {
        self.test_data.get_or_insert_with(TestData::default)
    }

    /// One-line preview used in version listings.
    ///
    /// First line of the description, cut at 60 characters with `...` when
    /// truncated, falling back to the title and then to "Untitled".
    pub fn preview(&self) -> String {
        let first_line = self.description.lines().next().unwrap_or("");
        let preview = if first_line.chars().count() > PREVIEW_LEN {
            let cut: String = first_line.chars().take(PREVIEW_LEN).collect();
            format!("{}...", cut)
        } else {
            first_line.to_string()
        };

        if !preview.is_empty() {
            preview
        } else if !self.title.is_empty() {
            self.title.clone()
        } else {
            "Untitled".to_string()
        }
    }
}

/// Unique identifier of a version. Generated at creation, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    pub fn generate() -> Self {
        Self(format!("v_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An immutable snapshot of a [`StoryContent`].
///
/// Fields are only reachable through getters; nothing can edit a version
/// once it has been recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryVersion {
    id: VersionId,
    timestamp: DateTime<Utc>,
    label: String,
    preview: String,
    content: StoryContent,
}

impl StoryVersion {
    pub(crate) fn capture(content: &StoryContent, label: String) -> Self {
        Self {
            id: VersionId::generate(),
            timestamp: Utc::now(),
            label,
            preview: content.preview(),
            content: content.clone(),
        }
    }

    pub fn id(&self) -> &VersionId {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn content(&self) -> &StoryContent {
        &self.content
    }

    pub fn title(&self) -> &str {
        &self.content.title
    }

    pub fn story_points(&self) -> u32 {
        self.content.story_points
    }

    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id.clone(),
            timestamp: self.timestamp,
            label: self.label.clone(),
            preview: self.preview.clone(),
        }
    }
}

/// Summary for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: VersionId,
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub preview: String,
}

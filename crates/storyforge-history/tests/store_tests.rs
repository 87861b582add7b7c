use storyforge_history::{Fingerprint, StoryContent, TestData, VersionStore};

/// Helper: a story with some test data attached.
fn sample_content(title: &str) -> StoryContent {
    StoryContent {
        title: title.to_string(),
        description: "As a shopper, I want to save my cart so that I can come back later."
            .to_string(),
        acceptance_criteria: vec![
            "Cart persists for signed-in users".to_string(),
            "Cart expires after 30 days".to_string(),
        ],
        story_points: 3,
        test_data: Some(TestData {
            user_inputs: vec!["shopper@example.com".to_string()],
            edge_cases: vec!["Cart contains discontinued item".to_string()],
            api_responses: vec![serde_json::json!({"status": 200})],
            code_snippets: vec![],
        }),
    }
}

// ============================================================
// Ordering
// ============================================================

#[test]
fn test_versions_are_newest_first() {
    let mut store = VersionStore::new();
    store.save(&sample_content("A"), "first");
    store.save(&sample_content("B"), "second");
    store.save(&sample_content("C"), "third");

    let titles: Vec<&str> = store.versions().iter().map(|v| v.title()).collect();
    assert_eq!(titles, vec!["C", "B", "A"]);
    assert_eq!(store.latest().unwrap().label(), "third");
    assert_eq!(store.len(), 3);
}

#[test]
fn test_save_returns_created_version() {
    let mut store = VersionStore::new();
    let version = store.save(&sample_content("Saved cart"), "Manual Save");

    assert_eq!(version.label(), "Manual Save");
    assert_eq!(version.title(), "Saved cart");
    assert_eq!(version.story_points(), 3);
    assert_eq!(
        version.preview(),
        "As a shopper, I want to save my cart so that I can come back..."
    );
}

#[test]
fn test_identical_saves_through_store_always_create_entries() {
    let mut store = VersionStore::new();
    let content = sample_content("Same");
    store.save(&content, "Manual Save");
    store.save(&content, "Manual Save");

    assert_eq!(store.len(), 2);
    assert_ne!(store.versions()[0].id(), store.versions()[1].id());
}

// ============================================================
// Isolation
// ============================================================

#[test]
fn test_mutating_source_does_not_touch_version() {
    let mut store = VersionStore::new();
    let mut content = sample_content("Original");
    let id = store.save(&content, "L1").id().clone();

    content.title = "Changed".to_string();
    content.acceptance_criteria.push("New criterion".to_string());
    content.story_points = 13;
    content
        .test_data_mut()
        .edge_cases
        .push("Another edge".to_string());

    let stored = store.get(id.as_str()).unwrap();
    assert_eq!(stored.content(), &sample_content("Original"));
    assert_eq!(stored.content().acceptance_criteria.len(), 2);
    assert_eq!(
        stored.content().test_data.as_ref().unwrap().edge_cases.len(),
        1
    );
}

// ============================================================
// Lookup and clear
// ============================================================

#[test]
fn test_get_unknown_id_is_none() {
    let mut store = VersionStore::new();
    store.save(&sample_content("A"), "first");
    assert!(store.get("v_does_not_exist").is_none());
}

#[test]
fn test_get_finds_older_versions() {
    let mut store = VersionStore::new();
    let first = store.save(&sample_content("A"), "first").id().clone();
    store.save(&sample_content("B"), "second");

    assert_eq!(store.get(first.as_str()).unwrap().title(), "A");
}

#[test]
fn test_clear_empties_store() {
    let mut store = VersionStore::new();
    store.save(&sample_content("A"), "first");
    store.save(&sample_content("B"), "second");

    assert_eq!(store.clear(), 2);
    assert!(store.is_empty());
    assert!(store.latest().is_none());
    assert!(store.summaries().is_empty());
}

#[test]
fn test_summaries_match_versions() {
    let mut store = VersionStore::new();
    store.save(&sample_content("A"), "first");
    store.save(&StoryContent::default(), "empty");

    let summaries = store.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].label, "empty");
    assert_eq!(summaries[0].preview, "Untitled");
    assert_eq!(summaries[1].id, *store.versions()[1].id());
}

#[test]
fn test_version_content_fingerprint_matches_source() {
    let mut store = VersionStore::new();
    let content = sample_content("A");
    let version = store.save(&content, "first");
    assert_eq!(
        Fingerprint::of(version.content()),
        Fingerprint::of(&content)
    );
}

//! # storyforge-history
//!
//! Version history for a single story editing session.
//!
//! ## Key Types
//!
//! - [`StoryContent`] - The editable story (title, description, criteria, points, test data)
//! - [`StoryVersion`] - An immutable, labelled snapshot of a [`StoryContent`]
//! - [`VersionStore`] - Newest-first list of snapshots for the current session
//! - [`Fingerprint`] - Digest used to detect "nothing changed since the last save"
//!
//! Every version owns a deep copy of the content it was created from, so
//! editing the live draft never reaches back into history.

pub mod fingerprint;
pub mod store;
pub mod types;

pub use fingerprint::Fingerprint;
pub use store::VersionStore;
pub use types::{StoryContent, StoryVersion, TestData, VersionId, VersionSummary};

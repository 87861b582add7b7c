//! # storyforge-diff
//!
//! Field-level comparison between a recorded story version and the
//! current working draft.
//!
//! ## Overview
//!
//! Before restoring a version, the user reviews what would change:
//! - Title and description are compared as whole values
//! - Acceptance criteria are compared by value, ignoring order
//! - Story points are compared as a scalar
//! - Test-data edge cases get the same treatment as criteria when present
//!
//! ## Key Types
//!
//! - [`DiffEngine`] - Computes a [`StoryDiff`]
//! - [`FieldChange`] - Unchanged value or an old/new pair
//! - [`ListDiff`] - Unchanged, removed and added items of a list field
//! - [`DiffSummary`] - Counts for logging and badges
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storyforge_diff::DiffEngine;
//!
//! let diff = DiffEngine::new().compare(&version, &draft);
//! if diff.has_changes() {
//!     println!("{}", diff);
//! }
//! ```

mod diff;
mod render;

pub use diff::{DiffEngine, DiffSummary, FieldChange, ListDiff, StoryDiff};

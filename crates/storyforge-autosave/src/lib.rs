//! # storyforge-autosave
//!
//! Decides when the working draft should be snapshotted automatically.
//!
//! Two rules run side by side:
//! - **Debounce**: a save after the draft has been quiet for `debounce`
//!   (default 5 s), labelled "Edited by User"
//! - **Backstop**: a periodic check every `interval` (default 2 min),
//!   labelled "Auto-Save @ HH:MM"
//!
//! Both only fire when the draft differs from the last saved content and has
//! something worth saving. The scheduler holds deadlines and a fingerprint,
//! never content; time is passed in by the caller so the policy can be
//! driven by a real timer or stepped through in tests.

mod config;
mod scheduler;

pub use config::AutoSaveConfig;
pub use scheduler::{AutoSaveDecision, AutoSaveScheduler, AutoSaveTrigger, EDITED_BY_USER};

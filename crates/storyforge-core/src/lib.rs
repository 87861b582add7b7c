//! # storyforge-core
//!
//! Session orchestration for the storyforge story editor.
//!
//! A [`StorySession`] is the one context object the UI talks to. It owns
//! the working draft and wires it to version history, the auto-save policy,
//! the confirmation-gated [`RestoreFlow`], the story generator and the
//! refinement assistant. [`SessionHandle`] runs a session on a tokio task so
//! auto-save timers fire on their own.

pub mod assistant;
mod context;
mod error;
pub mod generator;
mod restore;
mod runtime;

pub use assistant::{AssistantReply, RefinementAssistant, Suggestion, SuggestionContext};
pub use context::{
    NotificationCallback, SessionNotification, StorySession, INITIAL_GENERATION, MANUAL_SAVE,
    REFINEMENT_APPLIED,
};
pub use error::SessionError;
pub use generator::{MockStoryGenerator, StoryGenerator};
pub use restore::{RestoreFlow, RestoreState};
pub use runtime::SessionHandle;

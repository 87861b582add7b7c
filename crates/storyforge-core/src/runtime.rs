//! Drives a [`StorySession`] on a tokio task.
//!
//! The task is the only owner of the session. Callers talk to it through a
//! cloneable [`SessionHandle`]; between commands the task sleeps until the
//! next auto-save deadline and then lets the session run its rules.

use std::future;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use storyforge_diff::StoryDiff;
use storyforge_history::{StoryContent, StoryVersion, VersionSummary};

use crate::assistant::{AssistantReply, Suggestion};
use crate::context::StorySession;
use crate::error::SessionError;

enum SessionCommand {
    Edit {
        content: StoryContent,
        reply: oneshot::Sender<()>,
    },
    Generate {
        requirements: String,
        reply: oneshot::Sender<StoryVersion>,
    },
    AttachDevNotes {
        reply: oneshot::Sender<()>,
    },
    Ask {
        message: String,
        reply: oneshot::Sender<AssistantReply>,
    },
    ApplySuggestion {
        suggestion: Suggestion,
        reply: oneshot::Sender<StoryVersion>,
    },
    SaveVersion {
        label: String,
        reply: oneshot::Sender<StoryVersion>,
    },
    Draft {
        reply: oneshot::Sender<StoryContent>,
    },
    Versions {
        reply: oneshot::Sender<Vec<VersionSummary>>,
    },
    Diff {
        version_id: String,
        reply: oneshot::Sender<Option<StoryDiff>>,
    },
    RequestRestore {
        version_id: String,
        reply: oneshot::Sender<Result<StoryVersion, SessionError>>,
    },
    ConfirmRestore {
        reply: oneshot::Sender<Result<StoryContent, SessionError>>,
    },
    CancelRestore {
        reply: oneshot::Sender<bool>,
    },
    RestoreVersion {
        version_id: String,
        reply: oneshot::Sender<Result<StoryContent, SessionError>>,
    },
    ClearVersions {
        reply: oneshot::Sender<usize>,
    },
    NewStory {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to a running session task
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Move `session` onto its own task.
    ///
    /// The task ends once every handle is dropped and hands the session back.
    pub fn spawn(session: StorySession) -> (Self, JoinHandle<StorySession>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(session, rx));
        (Self { tx }, task)
    }

    pub async fn edit(&self, content: StoryContent) -> Result<(), SessionError> {
        self.call(|reply| SessionCommand::Edit { content, reply })
            .await
    }

    pub async fn generate(&self, requirements: &str) -> Result<StoryVersion, SessionError> {
        let requirements = requirements.to_string();
        self.call(|reply| SessionCommand::Generate {
            requirements,
            reply,
        })
        .await
    }

    pub async fn attach_dev_notes(&self) -> Result<(), SessionError> {
        self.call(|reply| SessionCommand::AttachDevNotes { reply })
            .await
    }

    pub async fn ask(&self, message: &str) -> Result<AssistantReply, SessionError> {
        let message = message.to_string();
        self.call(|reply| SessionCommand::Ask { message, reply })
            .await
    }

    pub async fn apply_suggestion(
        &self,
        suggestion: Suggestion,
    ) -> Result<StoryVersion, SessionError> {
        self.call(|reply| SessionCommand::ApplySuggestion { suggestion, reply })
            .await
    }

    pub async fn save_version(&self, label: &str) -> Result<StoryVersion, SessionError> {
        let label = label.to_string();
        self.call(|reply| SessionCommand::SaveVersion { label, reply })
            .await
    }

    pub async fn draft(&self) -> Result<StoryContent, SessionError> {
        self.call(|reply| SessionCommand::Draft { reply }).await
    }

    pub async fn versions(&self) -> Result<Vec<VersionSummary>, SessionError> {
        self.call(|reply| SessionCommand::Versions { reply }).await
    }

    pub async fn diff(&self, version_id: &str) -> Result<Option<StoryDiff>, SessionError> {
        let version_id = version_id.to_string();
        self.call(|reply| SessionCommand::Diff { version_id, reply })
            .await
    }

    pub async fn request_restore(&self, version_id: &str) -> Result<StoryVersion, SessionError> {
        let version_id = version_id.to_string();
        self.call(|reply| SessionCommand::RequestRestore { version_id, reply })
            .await?
    }

    pub async fn confirm_restore(&self) -> Result<StoryContent, SessionError> {
        self.call(|reply| SessionCommand::ConfirmRestore { reply })
            .await?
    }

    pub async fn cancel_restore(&self) -> Result<bool, SessionError> {
        self.call(|reply| SessionCommand::CancelRestore { reply })
            .await
    }

    /// Request and confirm in one step, with no other command in between
    pub async fn restore_version(&self, version_id: &str) -> Result<StoryContent, SessionError> {
        let version_id = version_id.to_string();
        self.call(|reply| SessionCommand::RestoreVersion { version_id, reply })
            .await?
    }

    pub async fn clear_versions(&self) -> Result<usize, SessionError> {
        self.call(|reply| SessionCommand::ClearVersions { reply })
            .await
    }

    pub async fn new_story(&self) -> Result<(), SessionError> {
        self.call(|reply| SessionCommand::NewStory { reply }).await
    }

    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .map_err(|_| SessionError::SessionClosed)?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }
}

async fn run(
    mut session: StorySession,
    mut rx: mpsc::UnboundedReceiver<SessionCommand>,
) -> StorySession {
    debug!("Story session task started");

    loop {
        let deadline = session.next_autosave_deadline();

        tokio::select! {
            biased;

            command = rx.recv() => match command {
                Some(command) => handle(&mut session, command),
                None => break,
            },
            _ = wait_until(deadline) => {
                // The deadline is recomputed each pass, so a reset or a newer
                // edit has already moved or cleared it.
                if let Some(version) = session.tick(now()) {
                    trace!(id = %version.id(), "Auto-save fired");
                }
            }
        }
    }

    debug!("Story session task stopped");
    session
}

fn handle(session: &mut StorySession, command: SessionCommand) {
    // A dropped receiver just means the caller stopped waiting.
    match command {
        SessionCommand::Edit { content, reply } => {
            session.edit_draft(content, now());
            let _ = reply.send(());
        }
        SessionCommand::Generate {
            requirements,
            reply,
        } => {
            let _ = reply.send(session.generate(&requirements));
        }
        SessionCommand::AttachDevNotes { reply } => {
            session.attach_dev_notes(now());
            let _ = reply.send(());
        }
        SessionCommand::Ask { message, reply } => {
            let _ = reply.send(session.ask(&message));
        }
        SessionCommand::ApplySuggestion { suggestion, reply } => {
            let _ = reply.send(session.apply_suggestion(&suggestion));
        }
        SessionCommand::SaveVersion { label, reply } => {
            let _ = reply.send(session.save_version(&label));
        }
        SessionCommand::Draft { reply } => {
            let _ = reply.send(session.draft().clone());
        }
        SessionCommand::Versions { reply } => {
            let _ = reply.send(session.version_summaries());
        }
        SessionCommand::Diff { version_id, reply } => {
            let _ = reply.send(session.diff(&version_id));
        }
        SessionCommand::RequestRestore { version_id, reply } => {
            let _ = reply.send(session.request_restore(&version_id));
        }
        SessionCommand::ConfirmRestore { reply } => {
            let _ = reply.send(session.confirm_restore(now()));
        }
        SessionCommand::CancelRestore { reply } => {
            let _ = reply.send(session.cancel_restore());
        }
        SessionCommand::RestoreVersion { version_id, reply } => {
            let _ = reply.send(session.restore_version(&version_id, now()));
        }
        SessionCommand::ClearVersions { reply } => {
            let _ = reply.send(session.clear_versions(now()));
        }
        SessionCommand::NewStory { reply } => {
            session.new_story(now());
            let _ = reply.send(());
        }
    }
}

/// Session time comes from tokio's clock so paused-time tests stay consistent.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

async fn wait_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(Instant::from_std(deadline)).await,
        None => future::pending().await,
    }
}

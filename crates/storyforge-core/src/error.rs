use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("No version selected to restore")]
    NoRestoreTarget,

    #[error("No restore is awaiting confirmation")]
    NoPendingRestore,

    #[error("Story session is no longer running")]
    SessionClosed,
}

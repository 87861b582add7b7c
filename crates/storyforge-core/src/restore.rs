use tracing::debug;

use storyforge_history::{StoryContent, StoryVersion};

use crate::error::SessionError;

/// Where the restore flow currently is.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RestoreState {
    #[default]
    Idle,
    /// Waiting for the user to confirm overwriting the draft
    ConfirmPending(StoryVersion),
}

/// Confirmation-gated overwrite of the working draft with a recorded version.
///
/// `Idle -> ConfirmPending -> Idle`, either through `confirm` (draft
/// overwritten) or `cancel` (draft untouched).
#[derive(Debug, Default)]
pub struct RestoreFlow {
    state: RestoreState,
}

impl RestoreFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RestoreState {
        &self.state
    }

    pub fn pending(&self) -> Option<&StoryVersion> {
        match &self.state {
            RestoreState::ConfirmPending(version) => Some(version),
            RestoreState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    /// Select a version and wait for confirmation.
    ///
    /// A new request replaces any target still pending.
    pub fn request(&mut self, target: Option<StoryVersion>) -> Result<(), SessionError> {
        let version = target.ok_or(SessionError::NoRestoreTarget)?;
        debug!(id = %version.id(), label = version.label(), "Restore awaiting confirmation");
        self.state = RestoreState::ConfirmPending(version);
        Ok(())
    }

    /// Overwrite `draft` with a fresh copy of the pending version.
    ///
    /// Returns the version that was applied; the flow is idle afterwards.
    pub fn confirm(&mut self, draft: &mut StoryContent) -> Result<StoryVersion, SessionError> {
        match std::mem::take(&mut self.state) {
            RestoreState::ConfirmPending(version) => {
                *draft = version.content().clone();
                debug!(id = %version.id(), "Restore applied");
                Ok(version)
            }
            RestoreState::Idle => Err(SessionError::NoPendingRestore),
        }
    }

    /// Drop the pending target. Returns it, if there was one.
    pub fn cancel(&mut self) -> Option<StoryVersion> {
        match std::mem::take(&mut self.state) {
            RestoreState::ConfirmPending(version) => Some(version),
            RestoreState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_history::{TestData, VersionStore};

    fn version_with_points(points: u32) -> StoryVersion {
        let mut store = VersionStore::new();
        let content = StoryContent {
            title: "Invite teammates".into(),
            description: "As an admin, I want to invite teammates.".into(),
            acceptance_criteria: vec!["Invite email is sent".into()],
            story_points: points,
            test_data: Some(TestData {
                edge_cases: vec!["Invitee already a member".into()],
                ..Default::default()
            }),
        };
        let version = store.save(&content, "Manual Save").clone();
        version
    }

    #[test]
    fn test_confirm_overwrites_draft() {
        let mut flow = RestoreFlow::new();
        let mut draft = StoryContent {
            title: "Something else".into(),
            story_points: 5,
            ..Default::default()
        };

        flow.request(Some(version_with_points(8))).unwrap();
        assert!(flow.is_pending());

        let applied = flow.confirm(&mut draft).unwrap();
        assert_eq!(draft.story_points, 8);
        assert_eq!(&draft, applied.content());
        assert_eq!(flow.state(), &RestoreState::Idle);
    }

    #[test]
    fn test_restored_draft_is_independent_copy() {
        let mut flow = RestoreFlow::new();
        let mut draft = StoryContent::default();
        flow.request(Some(version_with_points(3))).unwrap();
        let applied = flow.confirm(&mut draft).unwrap();

        draft.acceptance_criteria.push("Extra".into());
        draft.test_data_mut().edge_cases.clear();

        assert_eq!(applied.content().acceptance_criteria.len(), 1);
        assert_eq!(
            applied.content().test_data.as_ref().unwrap().edge_cases.len(),
            1
        );
    }

    #[test]
    fn test_cancel_leaves_draft_alone() {
        let mut flow = RestoreFlow::new();
        let draft = StoryContent {
            story_points: 5,
            ..Default::default()
        };
        let before = draft.clone();

        flow.request(Some(version_with_points(8))).unwrap();
        let cancelled = flow.cancel().unwrap();
        assert_eq!(cancelled.story_points(), 8);
        assert_eq!(draft, before);
        assert!(!flow.is_pending());
        assert!(flow.cancel().is_none());
    }

    #[test]
    fn test_request_without_target_stays_idle() {
        let mut flow = RestoreFlow::new();
        assert_eq!(flow.request(None), Err(SessionError::NoRestoreTarget));
        assert_eq!(flow.state(), &RestoreState::Idle);
    }

    #[test]
    fn test_confirm_without_request_fails() {
        let mut flow = RestoreFlow::new();
        let mut draft = StoryContent::default();
        assert_eq!(
            flow.confirm(&mut draft),
            Err(SessionError::NoPendingRestore)
        );
        assert_eq!(draft, StoryContent::default());
    }

    #[test]
    fn test_new_request_replaces_pending_target() {
        let mut flow = RestoreFlow::new();
        flow.request(Some(version_with_points(3))).unwrap();
        flow.request(Some(version_with_points(13))).unwrap();

        let mut draft = StoryContent::default();
        flow.confirm(&mut draft).unwrap();
        assert_eq!(draft.story_points, 13);
    }
}

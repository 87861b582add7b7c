use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use storyforge_autosave::{AutoSaveConfig, AutoSaveScheduler, AutoSaveTrigger};
use storyforge_diff::{DiffEngine, StoryDiff};
use storyforge_history::{StoryContent, StoryVersion, VersionStore, VersionSummary};
use storyforge_logging::{LogEvent, Logger, SaveTrigger};

use crate::assistant::{self, AssistantReply, RefinementAssistant, Suggestion};
use crate::error::SessionError;
use crate::generator::{MockStoryGenerator, StoryGenerator};
use crate::restore::RestoreFlow;

pub const INITIAL_GENERATION: &str = "Initial Generation";
pub const MANUAL_SAVE: &str = "Manual Save";
pub const REFINEMENT_APPLIED: &str = "Refinement Applied";

/// Outbound updates for whoever renders the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotification {
    /// The version list changed (newest first)
    VersionsChanged(Vec<VersionSummary>),
    /// A restore replaced the draft; form fields should show this content
    DraftRestored(StoryContent),
}

/// Callback invoked for every [`SessionNotification`]
pub type NotificationCallback = Arc<dyn Fn(&SessionNotification) + Send + Sync>;

/// Shared context for one story editing session.
///
/// Owns the working draft and everything that acts on it: version history,
/// auto-save policy, the restore flow, the generator and the assistant.
/// Operations that depend on time take `now` explicitly.
pub struct StorySession {
    draft: StoryContent,
    store: VersionStore,
    scheduler: AutoSaveScheduler,
    restore: RestoreFlow,
    diff_engine: DiffEngine,
    generator: Box<dyn StoryGenerator>,
    assistant: RefinementAssistant,
    logger: Arc<Logger>,
    observers: Vec<NotificationCallback>,
}

impl StorySession {
    pub fn new(config: AutoSaveConfig, logger: Arc<Logger>, now: Instant) -> Self {
        Self {
            draft: StoryContent::default(),
            store: VersionStore::new(),
            scheduler: AutoSaveScheduler::new(config, now),
            restore: RestoreFlow::new(),
            diff_engine: DiffEngine::new(),
            generator: Box::new(MockStoryGenerator),
            assistant: RefinementAssistant,
            logger,
            observers: Vec::new(),
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn StoryGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Register a callback for version list and restore updates
    pub fn on_notify(&mut self, callback: NotificationCallback) {
        self.observers.push(callback);
    }

    pub fn draft(&self) -> &StoryContent {
        &self.draft
    }

    /// All versions, newest first
    pub fn versions(&self) -> &[StoryVersion] {
        self.store.versions()
    }

    pub fn version_summaries(&self) -> Vec<VersionSummary> {
        self.store.summaries()
    }

    pub fn scheduler(&self) -> &AutoSaveScheduler {
        &self.scheduler
    }

    pub fn pending_restore(&self) -> Option<&StoryVersion> {
        self.restore.pending()
    }

    /// Next instant at which `tick` may save, if any timer is armed
    pub fn next_autosave_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    // ------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------

    /// Replace the working draft
    pub fn edit_draft(&mut self, content: StoryContent, now: Instant) {
        self.draft = content;
        self.scheduler.observe_change(&self.draft, now);
    }

    /// Modify the working draft in place
    pub fn update_draft(&mut self, now: Instant, edit: impl FnOnce(&mut StoryContent)) {
        edit(&mut self.draft);
        self.scheduler.observe_change(&self.draft, now);
    }

    /// Fill the draft from the generator and record it as "Initial Generation"
    pub fn generate(&mut self, requirements: &str) -> StoryVersion {
        self.draft = self.generator.generate(requirements);
        info!(
            generator = self.generator.name(),
            title = %self.draft.title,
            "Generated story"
        );
        self.logger.log(&LogEvent::StoryGenerated {
            title: self.draft.title.clone(),
            criteria: self.draft.acceptance_criteria.len(),
            story_points: self.draft.story_points,
        });
        self.record(INITIAL_GENERATION.to_string(), SaveTrigger::Generation)
    }

    /// Attach generated developer notes to the draft's test data
    pub fn attach_dev_notes(&mut self, now: Instant) {
        let notes = self.generator.dev_notes(&self.draft);
        debug!(snippets = notes.len(), "Attaching dev notes");
        self.update_draft(now, |draft| draft.test_data_mut().code_snippets = notes);
    }

    /// Ask the refinement assistant about the story
    pub fn ask(&self, message: &str) -> AssistantReply {
        self.assistant.reply(message)
    }

    /// Apply an assistant suggestion and record it as "Refinement Applied"
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> StoryVersion {
        assistant::apply_suggestion(&mut self.draft, suggestion);
        self.logger.log(&LogEvent::SuggestionApplied {
            context: suggestion.context.as_str().to_string(),
            suggestion: suggestion.text.clone(),
        });
        self.record(REFINEMENT_APPLIED.to_string(), SaveTrigger::Refinement)
    }

    // ------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------

    /// Explicit user save. Always records a version, even if nothing changed.
    pub fn save_version(&mut self, label: &str) -> StoryVersion {
        self.record(label.to_string(), SaveTrigger::Manual)
    }

    /// Run auto-save rules that are due at `now`
    pub fn tick(&mut self, now: Instant) -> Option<StoryVersion> {
        let decision = self.scheduler.poll(&self.draft, now)?;
        let trigger = match decision.trigger {
            AutoSaveTrigger::Debounce => SaveTrigger::Debounce,
            AutoSaveTrigger::Backstop => SaveTrigger::Backstop,
        };
        Some(self.record(decision.label, trigger))
    }

    fn record(&mut self, label: String, trigger: SaveTrigger) -> StoryVersion {
        let version = self.store.save(&self.draft, label).clone();
        self.scheduler.record_saved(&self.draft);

        self.logger.log(&LogEvent::VersionSaved {
            version_id: version.id().to_string(),
            label: version.label().to_string(),
            trigger,
            total_versions: self.store.len(),
        });
        self.notify(&SessionNotification::VersionsChanged(self.store.summaries()));

        version
    }

    /// Drop all versions and forget the last saved content.
    ///
    /// A pending restore targets a version that no longer exists, so it is
    /// cancelled too.
    pub fn clear_versions(&mut self, now: Instant) -> usize {
        if let Some(version) = self.restore.cancel() {
            debug!(id = %version.id(), "Dropped pending restore with cleared history");
            self.logger.log(&LogEvent::RestoreCancelled {
                version_id: version.id().to_string(),
            });
        }

        let removed = self.store.clear();
        self.scheduler.reset(now);

        self.logger.log(&LogEvent::HistoryCleared { removed });
        self.notify(&SessionNotification::VersionsChanged(Vec::new()));

        removed
    }

    /// Start over: empty draft, empty history, no timers, no pending restore
    pub fn new_story(&mut self, now: Instant) {
        self.draft = StoryContent::default();
        self.clear_versions(now);
        self.logger.log(&LogEvent::SessionReset);
    }

    // ------------------------------------------------------------
    // Review and restore
    // ------------------------------------------------------------

    /// Compare a recorded version with the current draft. Unknown ids yield `None`.
    pub fn diff(&self, version_id: &str) -> Option<StoryDiff> {
        let Some(version) = self.store.get(version_id) else {
            self.report_missing(version_id);
            return None;
        };

        let diff = self.diff_engine.compare(version, &self.draft);
        self.logger.log(&LogEvent::DiffComputed {
            version_id: version_id.to_string(),
            fields_changed: diff
                .changed_fields()
                .into_iter()
                .map(String::from)
                .collect(),
        });
        Some(diff)
    }

    /// Select a version to restore; the draft is untouched until `confirm_restore`
    pub fn request_restore(&mut self, version_id: &str) -> Result<StoryVersion, SessionError> {
        let Some(target) = self.store.get(version_id).cloned() else {
            self.report_missing(version_id);
            return Err(SessionError::VersionNotFound(version_id.to_string()));
        };

        self.logger.log(&LogEvent::RestoreRequested {
            version_id: target.id().to_string(),
            label: target.label().to_string(),
        });
        self.restore.request(Some(target.clone()))?;
        Ok(target)
    }

    /// Overwrite the draft with the pending version
    ///
    /// By default the auto-save fingerprint is left alone, so the restored
    /// draft counts as an edit and is snapshotted again after the debounce.
    /// With `resync_after_restore` the restored content counts as saved.
    pub fn confirm_restore(&mut self, now: Instant) -> Result<StoryContent, SessionError> {
        let version = self.restore.confirm(&mut self.draft)?;

        if self.scheduler.config().resync_after_restore {
            self.scheduler.record_saved(&self.draft);
        } else {
            self.scheduler.observe_change(&self.draft, now);
        }

        info!(id = %version.id(), label = version.label(), "Restored version");
        self.logger.log(&LogEvent::RestoreConfirmed {
            version_id: version.id().to_string(),
            label: version.label().to_string(),
        });
        self.notify(&SessionNotification::DraftRestored(self.draft.clone()));

        Ok(self.draft.clone())
    }

    /// Abandon the pending restore. Returns false if nothing was pending.
    pub fn cancel_restore(&mut self) -> bool {
        match self.restore.cancel() {
            Some(version) => {
                self.logger.log(&LogEvent::RestoreCancelled {
                    version_id: version.id().to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Request and confirm in one step, for callers that already asked the user
    pub fn restore_version(
        &mut self,
        version_id: &str,
        now: Instant,
    ) -> Result<StoryContent, SessionError> {
        self.request_restore(version_id)?;
        self.confirm_restore(now)
    }

    fn report_missing(&self, version_id: &str) {
        warn!(id = version_id, "Ignoring request for unknown version");
        self.logger.log(&LogEvent::VersionNotFound {
            version_id: version_id.to_string(),
        });
    }

    fn notify(&self, notification: &SessionNotification) {
        for observer in &self.observers {
            observer(notification);
        }
    }
}

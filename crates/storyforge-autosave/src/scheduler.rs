use std::time::Instant;

use chrono::Local;
use tracing::{debug, trace};

use storyforge_history::{Fingerprint, StoryContent};

use crate::AutoSaveConfig;

/// Label used for saves fired by the debounce rule.
pub const EDITED_BY_USER: &str = "Edited by User";

/// Which rule asked for the save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveTrigger {
    Debounce,
    Backstop,
}

/// A save the caller should perform now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSaveDecision {
    pub trigger: AutoSaveTrigger,
    pub label: String,
}

/// Auto-save policy for one story session.
///
/// The caller reports draft changes with [`observe_change`], wakes the
/// scheduler at [`next_deadline`] with [`poll`], and reports every save it
/// makes (automatic or not) with [`record_saved`].
///
/// [`observe_change`]: AutoSaveScheduler::observe_change
/// [`next_deadline`]: AutoSaveScheduler::next_deadline
/// [`poll`]: AutoSaveScheduler::poll
/// [`record_saved`]: AutoSaveScheduler::record_saved
#[derive(Debug)]
pub struct AutoSaveScheduler {
    config: AutoSaveConfig,
    last_saved: Option<Fingerprint>,
    debounce_deadline: Option<Instant>,
    /// None when the backstop interval is zero
    next_backstop: Option<Instant>,
}

impl AutoSaveScheduler {
    pub fn new(config: AutoSaveConfig, now: Instant) -> Self {
        let next_backstop = Self::first_backstop(&config, now);
        Self {
            config,
            last_saved: None,
            debounce_deadline: None,
            next_backstop,
        }
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.config
    }

    /// Fingerprint of the last content reported through `record_saved`.
    pub fn last_saved(&self) -> Option<&Fingerprint> {
        self.last_saved.as_ref()
    }

    pub fn debounce_pending(&self) -> bool {
        self.debounce_deadline.is_some()
    }

    /// Whether `draft` has content worth saving that differs from the last save.
    pub fn is_dirty(&self, draft: &StoryContent) -> bool {
        draft.has_meaningful_content() && self.last_saved.as_ref() != Some(&Fingerprint::of(draft))
    }

    /// The draft changed: (re)arm the debounce if it is dirty.
    ///
    /// Returns true when the debounce timer is armed.
    pub fn observe_change(&mut self, draft: &StoryContent, now: Instant) -> bool {
        if self.is_dirty(draft) {
            self.debounce_deadline = Some(now + self.config.debounce);
            trace!(debounce_ms = self.config.debounce.as_millis(), "Debounce armed");
            true
        } else {
            if self.debounce_deadline.take().is_some() {
                debug!("Draft matches last save, debounce cancelled");
            }
            false
        }
    }

    /// Earliest instant at which `poll` may return a decision.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.next_backstop) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run whichever rules are due at `now`.
    ///
    /// Dirtiness is checked again here, so a timer that outlived the change
    /// it was armed for (reset, revert, save through another path) fires as
    /// a no-op.
    pub fn poll(&mut self, draft: &StoryContent, now: Instant) -> Option<AutoSaveDecision> {
        let debounce_due = self.debounce_deadline.is_some_and(|d| now >= d);
        if debounce_due {
            self.debounce_deadline = None;
        }

        let backstop_due = self.next_backstop.is_some_and(|b| now >= b);
        if backstop_due {
            self.advance_backstop(now);
        }

        if !debounce_due && !backstop_due {
            return None;
        }

        if !self.is_dirty(draft) {
            debug!(debounce_due, backstop_due, "Auto-save due but draft unchanged");
            return None;
        }

        let decision = if debounce_due {
            AutoSaveDecision {
                trigger: AutoSaveTrigger::Debounce,
                label: EDITED_BY_USER.to_string(),
            }
        } else {
            AutoSaveDecision {
                trigger: AutoSaveTrigger::Backstop,
                label: format!("Auto-Save @ {}", Local::now().format("%H:%M")),
            }
        };
        Some(decision)
    }

    /// A save happened through any path: remember it and drop the pending debounce.
    pub fn record_saved(&mut self, content: &StoryContent) {
        let fingerprint = Fingerprint::of(content);
        trace!(fingerprint = fingerprint.short(), "Recorded saved fingerprint");
        self.last_saved = Some(fingerprint);
        self.debounce_deadline = None;
    }

    /// Start over for a new story: forget the fingerprint and cancel both timers.
    pub fn reset(&mut self, now: Instant) {
        self.last_saved = None;
        self.debounce_deadline = None;
        self.next_backstop = Self::first_backstop(&self.config, now);
    }

    fn first_backstop(config: &AutoSaveConfig, now: Instant) -> Option<Instant> {
        if config.interval.is_zero() {
            None
        } else {
            Some(now + config.interval)
        }
    }

    fn advance_backstop(&mut self, now: Instant) {
        if let Some(mut next) = self.next_backstop {
            while next <= now {
                next += self.config.interval;
            }
            self.next_backstop = Some(next);
        }
    }
}

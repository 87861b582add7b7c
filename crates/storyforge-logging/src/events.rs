use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// What caused a version to be recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTrigger {
    Manual,
    Generation,
    Refinement,
    Debounce,
    Backstop,
}

impl SaveTrigger {
    pub fn is_automatic(&self) -> bool {
        matches!(self, SaveTrigger::Debounce | SaveTrigger::Backstop)
    }
}

/// Structured log events for a story session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    StoryGenerated {
        title: String,
        criteria: usize,
        story_points: u32,
    },
    VersionSaved {
        version_id: String,
        label: String,
        trigger: SaveTrigger,
        total_versions: usize,
    },
    SuggestionApplied {
        context: String,
        suggestion: String,
    },
    DiffComputed {
        version_id: String,
        fields_changed: Vec<String>,
    },
    RestoreRequested {
        version_id: String,
        label: String,
    },
    RestoreConfirmed {
        version_id: String,
        label: String,
    },
    RestoreCancelled {
        version_id: String,
    },
    VersionNotFound {
        version_id: String,
    },
    HistoryCleared {
        removed: usize,
    },
    SessionReset,
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for session events - handles console output and file logging
pub struct Logger {
    format: LogFormat,
    console: bool,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            console: true,
            file_writer: None,
        }
    }

    /// A logger that writes nothing to the console
    pub fn silent() -> Self {
        Self {
            format: LogFormat::Json,
            console: false,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            console: true,
            file_writer: Some(Mutex::new(file)),
        })
    }

    /// Turn console output on or off, keeping any file output
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if !self.console {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::StoryGenerated {
                title,
                criteria,
                story_points,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} {}",
                    "✦".bright_magenta(),
                    "Generated".bright_magenta().bold(),
                    title.bold()
                );
                let _ = writeln!(
                    stderr,
                    "    {}",
                    format!("{} criteria, {} points", criteria, story_points).dimmed()
                );
            }
            LogEvent::VersionSaved {
                version_id,
                label,
                trigger,
                total_versions,
            } => {
                let marker = if trigger.is_automatic() {
                    "↻".bright_cyan()
                } else {
                    "●".bright_green()
                };
                let _ = writeln!(
                    stderr,
                    "{} {} {} {}",
                    marker,
                    "Saved".bright_green(),
                    label.bold(),
                    format!("({}, {} total)", Self::short_id(version_id), total_versions)
                        .dimmed()
                );
            }
            LogEvent::SuggestionApplied {
                context,
                suggestion,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} {}",
                    "✓".bright_green(),
                    format!("Applied {} suggestion:", context).bright_green(),
                    Self::truncate(suggestion, 60).dimmed()
                );
            }
            LogEvent::DiffComputed {
                version_id,
                fields_changed,
            } => {
                let changed = if fields_changed.is_empty() {
                    "no changes".to_string()
                } else {
                    fields_changed.join(", ")
                };
                let _ = writeln!(
                    stderr,
                    "{} {} {}",
                    "⇄".bright_blue(),
                    format!("Diff vs {}:", Self::short_id(version_id)).bright_blue(),
                    changed.dimmed()
                );
            }
            LogEvent::RestoreRequested { label, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} Restore '{}'? Your current draft will be overwritten.",
                    "?".bright_yellow(),
                    label.bold()
                );
            }
            LogEvent::RestoreConfirmed { label, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {} {}",
                    "⟲".bright_green(),
                    "Restored".bright_green().bold(),
                    label
                );
            }
            LogEvent::RestoreCancelled { .. } => {
                let _ = writeln!(stderr, "{} {}", "✗".dimmed(), "Restore cancelled".dimmed());
            }
            LogEvent::VersionNotFound { version_id } => {
                let _ = writeln!(
                    stderr,
                    "{} Version {} not found",
                    "⚠".bright_yellow(),
                    version_id
                );
            }
            LogEvent::HistoryCleared { removed } => {
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "⌫".bright_red(),
                    format!(
                        "Cleared {} {}",
                        removed,
                        if *removed == 1 { "version" } else { "versions" }
                    )
                    .bright_red()
                );
            }
            LogEvent::SessionReset => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "── New story ─────────────────────────────────────".bright_blue()
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::StoryGenerated { title, .. } => {
                format!("[{}] story:generated {}", timestamp, title)
            }
            LogEvent::VersionSaved {
                version_id,
                label,
                trigger,
                ..
            } => format!(
                "[{}] version:saved {} {:?} {}",
                timestamp,
                Self::short_id(version_id),
                trigger,
                label
            ),
            LogEvent::SuggestionApplied { context, .. } => {
                format!("[{}] suggestion:applied {}", timestamp, context)
            }
            LogEvent::DiffComputed {
                version_id,
                fields_changed,
            } => format!(
                "[{}] diff:{} {}",
                timestamp,
                Self::short_id(version_id),
                fields_changed.len()
            ),
            LogEvent::RestoreRequested { version_id, .. } => {
                format!("[{}] restore:pending {}", timestamp, Self::short_id(version_id))
            }
            LogEvent::RestoreConfirmed { version_id, .. } => {
                format!("[{}] restore:done {}", timestamp, Self::short_id(version_id))
            }
            LogEvent::RestoreCancelled { version_id } => {
                format!("[{}] restore:cancel {}", timestamp, Self::short_id(version_id))
            }
            LogEvent::VersionNotFound { version_id } => {
                format!("[{}] version:missing {}", timestamp, version_id)
            }
            LogEvent::HistoryCleared { removed } => {
                format!("[{}] history:cleared {}", timestamp, removed)
            }
            LogEvent::SessionReset => format!("[{}] session:reset", timestamp),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// `v_` plus the first 8 characters of the id
    fn short_id(id: &str) -> &str {
        let end = id.char_indices().nth(10).map_or(id.len(), |(i, _)| i);
        &id[..end]
    }

    fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() > max_chars {
            let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", cut)
        } else {
            s.to_string()
        }
    }
}

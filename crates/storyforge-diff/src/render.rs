use std::fmt;

use crate::diff::{FieldChange, ListDiff, StoryDiff};

impl fmt::Display for StoryDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Comparing '{}' ({}) with current draft",
            self.version_label,
            self.version_timestamp.format("%b %d %H:%M")
        )?;

        write_text(f, "Title", &self.title)?;
        write_text(f, "Description", &self.description)?;
        write_list(f, "Acceptance Criteria", &self.acceptance_criteria)?;

        match &self.story_points {
            FieldChange::Unchanged { value } => writeln!(f, "Story Points\n  {}", value)?,
            FieldChange::Changed { old, new } => {
                writeln!(f, "Story Points [changed]\n  {} → {}", old, new)?
            }
        }

        if let Some(edge_cases) = &self.edge_cases {
            write_list(f, "Test Data: Edge Cases", edge_cases)?;
        }

        Ok(())
    }
}

fn badge(changed: bool) -> &'static str {
    if changed {
        " [changed]"
    } else {
        ""
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, name: &str, change: &FieldChange<String>) -> fmt::Result {
    writeln!(f, "{}{}", name, badge(change.is_changed()))?;
    match change {
        FieldChange::Unchanged { value } if value.is_empty() => writeln!(f, "  (Empty)"),
        FieldChange::Unchanged { value } => writeln!(f, "  {}", value),
        FieldChange::Changed { old, new } => {
            if !old.is_empty() {
                writeln!(f, "  - REMOVED: {}", old)?;
            }
            if !new.is_empty() {
                writeln!(f, "  + ADDED: {}", new)?;
            }
            Ok(())
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, diff: &ListDiff) -> fmt::Result {
    writeln!(f, "{}{}", name, badge(diff.is_changed()))?;
    for item in &diff.unchanged {
        writeln!(f, "    {}", item)?;
    }
    for item in &diff.removed {
        writeln!(f, "  - REMOVED: {}", item)?;
    }
    for item in &diff.added {
        writeln!(f, "  + ADDED: {}", item)?;
    }
    Ok(())
}

//! TUI rendering traits for fieldpatch types.
//!
//! Extension traits that add colored terminal rendering to fieldpatch-core
//! types using owo_colors.

use fieldpatch_core::{ChangeKind, FieldChange, UpdateOutcome};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ChangeKind {
    fn render(&self) -> String {
        let symbol = self.to_string();
        match self {
            ChangeKind::Append => symbol.green().to_string(),
            ChangeKind::Replace => symbol.yellow().to_string(),
            ChangeKind::Unchanged => symbol.dimmed().to_string(),
        }
    }
}

impl Render for FieldChange {
    fn render(&self) -> String {
        let name = match self.kind {
            ChangeKind::Append => self.name.green().to_string(),
            ChangeKind::Replace => self.name.yellow().to_string(),
            ChangeKind::Unchanged => self.name.dimmed().to_string(),
        };
        format!("{} {}", self.kind.render(), name)
    }
}

impl Render for UpdateOutcome {
    fn render(&self) -> String {
        let mut lines = vec![format!("{} {}", "Updated".bold(), self.target)];

        if self.changes.is_empty() {
            lines.push(format!("   {}", "(no fields given)".dimmed()));
        }
        for change in &self.changes {
            lines.push(format!("   {}", change.render()));
        }

        lines.join("\n")
    }
}

//! What an upsert did to a single field.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The property did not exist and was added after the existing ones.
    Append,
    /// The first property with that name got a new value.
    Replace,
    /// The property already had exactly this value.
    Unchanged,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Append => write!(f, "+"),
            ChangeKind::Replace => write!(f, "~"),
            ChangeKind::Unchanged => write!(f, "="),
        }
    }
}

/// One applied field and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Uppercased property name.
    pub name: String,
    pub kind: ChangeKind,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

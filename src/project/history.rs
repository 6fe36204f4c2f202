//! Project history log
//!
//! The transport's view of the undo layer: recordings push a state once
//! committed, cancelled recordings roll back, selection changes modify the
//! current state, and arriving capture blocks request an autosave.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of history operations the transport performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// A new undoable state was pushed.
    Push,

    /// The current state was amended in place.
    Modify,

    /// Uncommitted changes were thrown away.
    Rollback,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryAction::Push => write!(f, "Push"),
            HistoryAction::Modify => write!(f, "Modify"),
            HistoryAction::Rollback => write!(f, "Rollback"),
        }
    }
}

/// A single history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: String,

    pub action: HistoryAction,

    /// Long description, e.g. "Recorded Audio".
    pub description: String,

    /// Short name shown in undo menus, e.g. "Record".
    pub short_name: String,

    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(action: HistoryAction, description: &str, short_name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action,
            description: description.to_string(),
            short_name: short_name.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// In-memory history of one project.
#[derive(Debug, Default)]
pub struct ProjectHistory {
    entries: Mutex<Vec<HistoryEntry>>,
    autosave_requests: Mutex<u64>,
}

impl ProjectHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_state(&self, description: &str, short_name: &str) {
        tracing::debug!("History push: {}", description);
        self.entries
            .lock()
            .push(HistoryEntry::new(HistoryAction::Push, description, short_name));
    }

    pub fn modify_state(&self) {
        self.entries
            .lock()
            .push(HistoryEntry::new(HistoryAction::Modify, "", ""));
    }

    pub fn rollback_state(&self) {
        tracing::debug!("History rollback");
        self.entries
            .lock()
            .push(HistoryEntry::new(HistoryAction::Rollback, "", ""));
    }

    /// Ask the persistence layer to autosave soon.
    pub fn request_autosave(&self) {
        *self.autosave_requests.lock() += 1;
    }

    pub fn autosave_requests(&self) -> u64 {
        *self.autosave_requests.lock()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().clone()
    }

    /// Entries of one kind, oldest first.
    pub fn entries_of(&self, action: HistoryAction) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<HistoryEntry> {
        self.entries.lock().last().cloned()
    }
}

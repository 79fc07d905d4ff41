//! Task data structure and related functionality.
//!
//! This module defines the `Task` record served by the API, together with the
//! allow-listed field sets a client may write on create and on update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters accepted in a task title.
pub const TITLE_MAX_CHARS: usize = 255;

/// A single to-do item as stored and as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields accepted when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

/// Validated fields accepted when updating a task.
///
/// `description` and `completed` are only written when the client sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl Task {
    /// Build a fresh, not yet completed task.
    pub fn new(id: u64, fields: NewTask, now: DateTime<Utc>) -> Self {
        Task {
            id,
            title: fields.title,
            description: fields.description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge submitted fields into this task and refresh `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        self.title = changes.title;
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }

    /// Copy of this task with the completion flag inverted.
    pub fn toggled(&self) -> Task {
        Task { completed: !self.completed, ..self.clone() }
    }
}

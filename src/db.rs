//! Task storage and formatting helpers.
//!
//! This module provides the `Database` struct that holds every task and
//! persists it as a single JSON document, along with the small formatting
//! utilities shared by the CLI table and the terminal UI.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{NewTask, Task};

/// Errors raised while reading or writing the JSON store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// In-memory task store, serialised as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Highest id ever issued. Ids are never reused after a delete.
    #[serde(default)]
    pub last_id: u64,
    pub tasks: Vec<Task>,
}

impl Database {
    /// Load the store from a JSON file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, DbError> {
        let buf = match fs::read_to_string(path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Database::default()),
            Err(source) => return Err(DbError::Read { path: path.to_path_buf(), source }),
        };
        let mut db: Database = serde_json::from_str(&buf)
            .map_err(|source| DbError::Parse { path: path.to_path_buf(), source })?;
        // Files written by hand may lack the counter.
        db.last_id = db.last_id.max(db.tasks.iter().map(|t| t.id).max().unwrap_or(0));
        Ok(db)
    }

    /// Save the store using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), DbError> {
        let data = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        let write = || -> io::Result<()> {
            let mut f = File::create(&tmp)?;
            f.write_all(data.as_bytes())?;
            f.flush()?;
            fs::rename(&tmp, path)
        };
        write().map_err(|source| DbError::Write { path: path.to_path_buf(), source })
    }

    /// Issue the next task id.
    pub fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Create and append a task, returning a copy of the stored record.
    pub fn insert(&mut self, fields: NewTask, now: DateTime<Utc>) -> Task {
        let id = self.next_id();
        let task = Task::new(id, fields, now);
        self.tasks.push(task.clone());
        task
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove a task by ID, returning it if it existed.
    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(idx))
    }
}

/// Short completion marker used in tables.
pub fn format_completed(completed: bool) -> &'static str {
    if completed { "Done" } else { "Open" }
}

/// Creation date in the local timezone.
pub fn format_created(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!("{:<5} {:<6} {:<10} {:<32} {}", "ID", "Status", "Created", "Title", "Description");
    for t in tasks {
        println!(
            "{:<5} {:<6} {:<10} {:<32} {}",
            t.id,
            format_completed(t.completed),
            format_created(t.created_at),
            truncate(&t.title, 32),
            t.description.as_deref().map(|d| truncate(d, 40)).unwrap_or_else(|| "-".into()),
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(title: &str) -> NewTask {
        NewTask { title: title.into(), description: None }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::load(&dir.path().join("tasks.json")).unwrap();
        assert_eq!(db, Database::default());
    }

    #[test]
    fn save_then_load_preserves_tasks_and_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut db = Database::default();
        db.insert(fields("a"), Utc::now());
        db.insert(fields("b"), Utc::now());
        db.remove(2);
        db.save(&path).unwrap();

        let loaded = Database::load(&path).unwrap();
        assert_eq!(loaded, db);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut db = Database::default();
        let a = db.insert(fields("a"), Utc::now());
        db.remove(a.id);
        let b = db.insert(fields("b"), Utc::now());
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Database::load(&path), Err(DbError::Parse { .. })));
    }

    #[test]
    fn counter_recovers_from_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut db = Database::default();
        db.insert(fields("a"), Utc::now());
        db.insert(fields("b"), Utc::now());
        let mut value = serde_json::to_value(&db).unwrap();
        value.as_object_mut().unwrap().remove("last_id");
        fs::write(&path, value.to_string()).unwrap();

        let mut loaded = Database::load(&path).unwrap();
        assert_eq!(loaded.next_id(), 3);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}

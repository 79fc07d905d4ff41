//! Shared server state: the task store behind a lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::{Database, DbError};
use crate::task::{NewTask, Task, TaskChanges};

/// Task store, optionally backed by a JSON file.
///
/// Mutations run against a copy of the database under the write lock and are
/// only committed in memory once the file write succeeded.
#[derive(Debug)]
pub struct Store {
    db: RwLock<Database>,
    path: Option<PathBuf>,
}

impl Store {
    pub fn in_memory() -> Self {
        Store { db: RwLock::new(Database::default()), path: None }
    }

    /// Open a file-backed store, loading whatever the file holds.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let db = Database::load(path)?;
        Ok(Store { db: RwLock::new(db), path: Some(path.to_path_buf()) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn len(&self) -> usize {
        self.db.read().await.tasks.len()
    }

    pub async fn list(&self) -> Vec<Task> {
        self.db.read().await.tasks.clone()
    }

    pub async fn get(&self, id: u64) -> Option<Task> {
        self.db.read().await.get(id).cloned()
    }

    pub async fn create(&self, fields: NewTask) -> Result<Task, DbError> {
        let mut guard = self.db.write().await;
        let mut next = guard.clone();
        let task = next.insert(fields, Utc::now());
        self.commit(&mut guard, next)?;
        Ok(task)
    }

    /// Returns `None` when the id does not exist.
    pub async fn update(&self, id: u64, changes: TaskChanges) -> Result<Option<Task>, DbError> {
        let mut guard = self.db.write().await;
        let mut next = guard.clone();
        let Some(task) = next.get_mut(id) else {
            return Ok(None);
        };
        task.apply(changes, Utc::now());
        let task = task.clone();
        self.commit(&mut guard, next)?;
        Ok(Some(task))
    }

    /// Returns `None` when the id does not exist.
    pub async fn delete(&self, id: u64) -> Result<Option<Task>, DbError> {
        let mut guard = self.db.write().await;
        let mut next = guard.clone();
        let Some(task) = next.remove(id) else {
            return Ok(None);
        };
        self.commit(&mut guard, next)?;
        Ok(Some(task))
    }

    /// Write `next` to disk (if file-backed), then make it the live database.
    fn commit(&self, current: &mut Database, next: Database) -> Result<(), DbError> {
        if let Some(path) = &self.path {
            next.save(path)?;
        }
        *current = next;
        Ok(())
    }
}

/// Handle passed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        AppState { store: Arc::new(store) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> NewTask {
        NewTask { title: title.into(), description: None }
    }

    #[tokio::test]
    async fn file_store_persists_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let store = Store::open(&path).unwrap();

        let task = store.create(fields("Buy milk")).await.unwrap();
        assert_eq!(Database::load(&path).unwrap().tasks, vec![task.clone()]);

        store
            .update(task.id, TaskChanges { title: "Buy bread".into(), description: None, completed: Some(true) })
            .await
            .unwrap()
            .unwrap();
        let on_disk = Database::load(&path).unwrap();
        assert_eq!(on_disk.tasks[0].title, "Buy bread");
        assert!(on_disk.tasks[0].completed);

        store.delete(task.id).await.unwrap().unwrap();
        assert!(Database::load(&path).unwrap().tasks.is_empty());
    }

    #[tokio::test]
    async fn missing_ids_do_not_touch_the_store() {
        let store = Store::in_memory();
        let changes = TaskChanges { title: "x".into(), description: None, completed: None };
        assert_eq!(store.update(9, changes).await.unwrap(), None);
        assert_eq!(store.delete(9).await.unwrap(), None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("tasks.json");
        let store = Store::open(&path).unwrap();

        assert!(matches!(store.create(fields("a")).await, Err(DbError::Write { .. })));
        assert_eq!(store.len().await, 0);
    }
}

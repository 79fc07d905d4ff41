//! Client-side board state and the actions that talk to the API.
//!
//! `Board` holds the last fetched list, the form buffer and the task being
//! edited. Every action awaits its request and then re-fetches the whole
//! list; the list shown is only ever as fresh as that last fetch. Failures
//! are logged and the action is abandoned with the form left as it was.

use tracing::error;

use crate::client::{ClientError, TaskClient};
use crate::task::Task;
use crate::tui::task_form::TaskForm;

#[derive(Debug, Default)]
pub struct Board {
    pub tasks: Vec<Task>,
    pub form: TaskForm,
    pub editing_task: Option<Task>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `tasks` with the server's current list.
    pub async fn fetch_tasks(&mut self, client: &TaskClient) -> bool {
        match client.list().await {
            Ok(tasks) => {
                self.tasks = tasks;
                true
            }
            Err(e) => {
                error!(error = %e, "failed to load tasks");
                false
            }
        }
    }

    /// Create a task from the form, or update the one being edited.
    ///
    /// On success the form is cleared, edit mode ends and the list is re-fetched.
    pub async fn submit(&mut self, client: &TaskClient) -> bool {
        let input = self.form.to_input();
        let result: Result<Task, ClientError> = match &self.editing_task {
            Some(task) => client.update(task.id, &input).await,
            None => client.create(&input).await,
        };
        if let Err(e) = result {
            error!(error = %e, "failed to save task");
            return false;
        }
        self.editing_task = None;
        self.form.clear();
        self.fetch_tasks(client).await;
        true
    }

    /// Load `task` into the form and enter edit mode. No request is sent.
    pub fn edit(&mut self, task: &Task) {
        self.form = TaskForm::from_task(task);
        self.editing_task = Some(task.clone());
    }

    /// Leave edit mode and empty the form.
    pub fn reset_form(&mut self) {
        self.editing_task = None;
        self.form.clear();
    }

    pub async fn delete(&mut self, client: &TaskClient, id: u64) -> bool {
        if let Err(e) = client.delete(id).await {
            error!(error = %e, id, "failed to delete task");
            return false;
        }
        self.fetch_tasks(client).await;
        true
    }

    /// Send the whole task back with `completed` inverted.
    pub async fn toggle_complete(&mut self, client: &TaskClient, task: &Task) -> bool {
        if let Err(e) = client.update(task.id, &task.toggled()).await {
            error!(error = %e, id = task.id, "failed to change task status");
            return false;
        }
        self.fetch_tasks(client).await;
        true
    }

    pub fn is_editing(&self) -> bool {
        self.editing_task.is_some()
    }
}

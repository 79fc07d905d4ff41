//! Command implementations for the CLI interface.
//!
//! One handler per subcommand. The task commands are thin wrappers over
//! [`TaskClient`]: they print the result on success, or report the error on
//! stderr and exit with status 1.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::client::{ClientError, TaskClient, TaskInput};
use crate::config::ServeArgs;
use crate::db::{format_completed, print_table};
use crate::task::Task;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),

    /// Launch the interactive UI interface.
    Ui,

    /// List all tasks.
    List,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// View a task in detail.
    View {
        /// Task ID.
        id: u64,
    },

    /// Replace a task's title and optionally its description or status.
    Update {
        /// Task ID.
        id: u64,
        /// New title.
        #[arg(long)]
        title: String,
        /// New description. Left unchanged when omitted.
        #[arg(long)]
        desc: Option<String>,
        /// Set the completed flag.
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Toggle a task between open and done.
    Complete {
        /// Task ID.
        id: u64,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: u64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Report a failed request and exit.
fn fail(action: &str, err: ClientError) -> ! {
    match err {
        ClientError::Validation { message, errors } => {
            eprintln!("Failed to {action}: {message}");
            for (field, msgs) in errors {
                for msg in msgs {
                    eprintln!("  {field}: {msg}");
                }
            }
        }
        ClientError::NotFound(id) => eprintln!("Task {id} not found."),
        other => eprintln!("Failed to {action}: {other}"),
    }
    std::process::exit(1);
}

/// Print every task as a table.
pub async fn cmd_list(client: &TaskClient) {
    let tasks = client.list().await.unwrap_or_else(|e| fail("list tasks", e));
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    print_table(&tasks);
}

pub async fn cmd_add(client: &TaskClient, title: String, desc: Option<String>) {
    let input = TaskInput { title, description: desc, completed: None };
    let task = client.create(&input).await.unwrap_or_else(|e| fail("add task", e));
    println!("Added task #{}: {}", task.id, task.title);
}

/// Show all fields of one task.
pub async fn cmd_view(client: &TaskClient, id: u64) {
    let task = client.get(id).await.unwrap_or_else(|e| fail("view task", e));
    print_task(&task);
}

fn print_task(task: &Task) {
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", format_completed(task.completed));
    println!("Created UTC:  {}", task.created_at.to_rfc3339());
    println!("Updated UTC:  {}", task.updated_at.to_rfc3339());
    println!("Description:\n{}", task.description.as_deref().unwrap_or("-"));
}

/// Update an existing task's fields.
pub async fn cmd_update(
    client: &TaskClient,
    id: u64,
    title: String,
    desc: Option<String>,
    completed: Option<bool>,
) {
    let input = TaskInput { title, description: desc, completed };
    let task = client.update(id, &input).await.unwrap_or_else(|e| fail("update task", e));
    println!("Updated task #{}.", task.id);
}

/// Flip the completed flag, sending the rest of the task back unchanged.
pub async fn cmd_complete(client: &TaskClient, id: u64) {
    let task = client.get(id).await.unwrap_or_else(|e| fail("complete task", e));
    let task = client
        .update(id, &task.toggled())
        .await
        .unwrap_or_else(|e| fail("complete task", e));
    println!("Task #{} is now {}.", task.id, format_completed(task.completed));
}

pub async fn cmd_delete(client: &TaskClient, id: u64) {
    client.delete(id).await.unwrap_or_else(|e| fail("delete task", e));
    println!("Deleted task #{id}.");
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn parses_update_flags() {
        let cli = Cli::try_parse_from([
            "tb", "update", "3", "--title", "Buy milk", "--desc", "2%", "--completed", "true",
        ])
        .unwrap();
        match cli.command {
            Commands::Update { id, title, desc, completed } => {
                assert_eq!(id, 3);
                assert_eq!(title, "Buy milk");
                assert_eq!(desc.as_deref(), Some("2%"));
                assert_eq!(completed, Some(true));
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn update_requires_title() {
        assert!(Cli::try_parse_from(["tb", "update", "3"]).is_err());
    }

    #[test]
    fn serve_flags_and_global_api_url() {
        let cli = Cli::try_parse_from(["tb", "serve", "--memory", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.memory);
                assert_eq!(args.bind.port(), 9000);
            }
            _ => panic!("expected serve"),
        }

        let cli = Cli::try_parse_from(["tb", "list", "--api-url", "http://example.test:1"]).unwrap();
        assert_eq!(cli.api_url, "http://example.test:1");
    }

    #[test]
    fn view_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["tb", "view", "abc"]).is_err());
    }
}

//! # Taskboard - task CRUD service and terminal client
//!
//! A small task tracker: an HTTP API that stores tasks in a JSON file, a
//! terminal user interface (TUI) that drives that API, and a handful of
//! one-shot commands for scripting.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the API (writes ./tasks.json)
//! tb serve
//!
//! # In another terminal, open the board
//! tb ui
//!
//! # Or script it
//! tb add "Buy milk" --desc "2%"
//! tb list
//! tb complete 1
//! ```
//!
//! ## Key Commands
//!
//! - `tb serve` - Run the REST API (`--bind`, `--db`, `--memory`)
//! - `tb ui` - Launch the TUI against `--api-url`
//! - `tb list | add | view | update | complete | delete` - One-shot task commands
//! - `tb completions <shell>` - Shell completion scripts
//!
//! The API base URL defaults to `http://127.0.0.1:8000` and can be changed at build
//! time or run time with `TASKBOARD_API_URL`. Logs go to stderr, except for the
//! TUI which writes them to `taskboard-ui.log` unless `--log-file` says otherwise.

use std::path::Path;

use clap::Parser;

pub mod cli;
pub mod client;
pub mod cmd;
pub mod config;
pub mod db;
pub mod logging;
pub mod server;
pub mod task;
pub mod validation;
pub mod tui {
    pub mod app;
    pub mod board;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use client::TaskClient;
use cmd::*;
use config::{CLIENT_LOG_FILTER, DEFAULT_UI_LOG_FILE, SERVER_LOG_FILTER};

fn main() {
    let cli = Cli::parse();

    let (filter, log_file) = match &cli.command {
        Commands::Serve(_) => (SERVER_LOG_FILTER, cli.log_file.as_deref()),
        Commands::Ui => (
            CLIENT_LOG_FILTER,
            Some(cli.log_file.as_deref().unwrap_or(Path::new(DEFAULT_UI_LOG_FILE))),
        ),
        _ => (CLIENT_LOG_FILTER, cli.log_file.as_deref()),
    };
    if let Err(e) = logging::init(filter, log_file) {
        eprintln!("Failed to initialise logging: {e:#}");
        std::process::exit(1);
    }

    let client = TaskClient::new(&cli.api_url);

    match cli.command {
        Commands::Serve(args) => {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Failed to start runtime: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = runtime.block_on(server::serve(args)) {
                eprintln!("Server error: {e:#}");
                std::process::exit(1);
            }
        }

        Commands::Ui => {
            if let Err(e) = tui::run::run_tui(client) {
                eprintln!("Error running TUI: {e}");
                std::process::exit(1);
            }
        }

        Commands::Completions { shell } => cmd_completions(shell),

        command => {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Failed to start runtime: {e}");
                    std::process::exit(1);
                }
            };
            runtime.block_on(async {
                match command {
                    Commands::List => cmd_list(&client).await,
                    Commands::Add { title, desc } => cmd_add(&client, title, desc).await,
                    Commands::View { id } => cmd_view(&client, id).await,
                    Commands::Update { id, title, desc, completed } => {
                        cmd_update(&client, id, title, desc, completed).await
                    }
                    Commands::Complete { id } => cmd_complete(&client, id).await,
                    Commands::Delete { id } => cmd_delete(&client, id).await,
                    Commands::Serve(_) | Commands::Ui | Commands::Completions { .. } => {
                        unreachable!("handled above")
                    }
                }
            });
        }
    }
}

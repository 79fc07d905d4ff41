use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::DEFAULT_API_URL;

/// Task board: a REST API for tasks plus a terminal client for it.
#[derive(Parser)]
#[command(name = "tb", version, about = "Task CRUD service and client")]
pub struct Cli {
    /// Base URL of the task API.
    #[arg(long, global = true, env = "TASKBOARD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true, env = "TASKBOARD_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

//! Runtime configuration shared by the server and the clients.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

/// API base URL baked in at build time, overridable at run time.
pub const DEFAULT_API_URL: &str = match option_env!("TASKBOARD_API_URL") {
    Some(url) => url,
    None => "http://127.0.0.1:8000",
};

/// Default log filter for the server.
pub const SERVER_LOG_FILTER: &str = "taskboard=info,tower_http=info";

/// Default log filter for the terminal UI and one-shot commands.
pub const CLIENT_LOG_FILTER: &str = "taskboard=info";

/// Log file used by the terminal UI when none is given.
pub const DEFAULT_UI_LOG_FILE: &str = "taskboard-ui.log";

/// Options for `tb serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "TASKBOARD_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Path to the JSON database file.
    #[arg(long, env = "TASKBOARD_DB", default_value = "tasks.json")]
    pub db: PathBuf,

    /// Keep tasks in memory only; nothing is written to disk.
    #[arg(long)]
    pub memory: bool,
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "runrow", version, about = "Pipeline activity list with live run timing")]
pub struct Cli {
    /// Pipeline record (JSON object)
    #[arg(short, long)]
    pub pipeline: PathBuf,

    /// Runs of the pipeline (JSON array)
    #[arg(short, long)]
    pub runs: PathBuf,

    /// Backend `classes` response used for capability checks
    #[arg(short, long)]
    pub classes: Option<PathBuf>,

    /// Jenkins base URL; enables stop, replay and opening runs in a browser
    #[arg(short, long)]
    pub server: Option<String>,

    /// Credentials passed to curl as user:api-token
    #[arg(short, long)]
    pub user: Option<String>,

    /// How far the local clock runs ahead of the server, in milliseconds
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub skew_ms: i64,

    /// Live update period in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Print the resolved rows and exit
    #[arg(long)]
    pub once: bool,

    /// Write debug logs to $XDG_STATE_HOME/runrow/debug.log
    #[arg(short, long)]
    pub verbose: bool,
}

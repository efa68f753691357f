use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common::notification::NotificationId;

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Talk to a running herald-daemon")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Daemon socket (overrides the configured path)
    #[arg(short, long, global = true)]
    pub socket: Option<PathBuf>,

    /// Print payloads and events as JSON lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the daemon is reachable
    Ping,
    /// List the notifications currently shown
    Active,
    /// Print notification events as they arrive
    Watch,
    /// Send a quick reply to a notification
    Reply {
        id: NotificationId,
        /// Reply text; words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Dismiss a notification
    Dismiss { id: NotificationId },
}

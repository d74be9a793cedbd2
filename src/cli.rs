//! Command-line interface for connect-four.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Connect Four with peer-validated moves over a content-addressed store
#[derive(Parser, Debug)]
#[command(name = "connect-four")]
#[command(about = "Peer-validated Connect Four", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the node configuration file
    #[arg(short, long, default_value = "connect_four.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the supported move types and the configured board
    Describe,

    /// Play a local two-agent game, one column per stdin line
    Hotseat {
        /// Agent that creates the game (defaults to the configured agent)
        #[arg(long)]
        creator: Option<String>,

        /// Invited opponent, who moves first
        #[arg(long, default_value = "opponent")]
        opponent: String,
    },
}

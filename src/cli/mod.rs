//! CLI command definitions for the kanban board driver.
//!
//! The driver is a headless harness over the board controller: it seeds a
//! board, optionally replays an intent script through it, and prints the
//! resulting view.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Headless driver for the in-memory kanban board
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (replaces project and user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed board file (YAML or JSON); the demo board is used otherwise
    #[arg(short, long, global = true)]
    pub seed: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format: markdown (default) or json
    #[arg(short, long, default_value = "markdown", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the initially revealed board (default if no subcommand given)
    Show,

    /// Print task count statistics for the whole board
    Stats,

    /// Run a YAML intent script through the controller and render the result
    Replay {
        /// Path to the intent script
        script: PathBuf,
    },
}

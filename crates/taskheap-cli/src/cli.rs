//! CLI argument definitions for taskheap.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// taskheap -- replay task scheduling scripts against an indexed priority heap.
#[derive(Parser)]
#[command(
    name = "taskheap",
    version,
    about = "taskheap -- indexed priority heap for task scheduling",
    long_about = "Feeds insert / extract / change-priority operations into a priority heap \
                  and prints the order in which tasks come out."
)]
pub struct Cli {
    /// Path to the TOML config file.  A missing file means defaults.
    #[arg(long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Default log level when `RUST_LOG` is not set (overrides the config).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the built-in five-task trace and print each extracted task.
    Trace,

    /// Replay a TOML script of heap operations.
    Replay {
        /// Script file containing `[[step]]` entries.
        script: PathBuf,

        /// Print each extracted task as a JSON object on its own line.
        #[arg(long)]
        json: bool,
    },
}

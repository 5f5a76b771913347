//! CLI entry point for taskheap.
//!
//! This binary provides the `taskheap` command with subcommands for running
//! the built-in trace and replaying operation scripts.

mod cli;
mod config;
mod helpers;
mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use taskheap_kernel::{HeapConfig, HeapHandle};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::config::load_config;
use crate::helpers::{format_task, init_tracing};
use crate::replay::{Script, run_script};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log.level));
    info!(config = %cli.config.display(), tie_break = ?config.heap.tie_break, "configuration loaded");

    let (script, json) = match cli.command {
        Commands::Trace => (Script::trace(), false),
        Commands::Replay { script, json } => (Script::load(&script)?, json),
    };

    cmd_replay(&config.heap, &script, json).await
}

// ---------------------------------------------------------------------------
// Subcommand: trace / replay
// ---------------------------------------------------------------------------

async fn cmd_replay(heap_config: &HeapConfig, script: &Script, json: bool) -> Result<()> {
    let (heap, worker) = HeapHandle::spawn(heap_config);
    info!(steps = script.steps.len(), "replaying script");

    let report = run_script(&heap, script).await?;

    for task in &report.extracted {
        println!("{}", format_task(task, json)?);
    }

    if !json {
        println!();
        println!("  Extracted:        {}", report.extracted.len());
        println!("  Still resident:   {}", report.remaining);
        if report.rejected > 0 {
            println!("  Duplicate ids:    {}", report.rejected);
        }
        if report.empty_extracts > 0 {
            println!("  Empty extracts:   {}", report.empty_extracts);
        }
    }

    heap.shutdown().await?;
    worker.await.context("heap worker panicked")?;
    Ok(())
}

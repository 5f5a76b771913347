//! Shared helper functions used across CLI subcommands.

use taskheap_kernel::Task;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Render an extracted task for stdout.
pub fn format_task(task: &Task, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string(task)?)
    } else {
        Ok(format!("task {:>6}  priority {:>6}", task.id, task.priority))
    }
}

//! Operation scripts and their execution.
//!
//! A script is a TOML document holding an array of `[[step]]` tables, each
//! tagged with an `op` field:
//!
//! ```toml
//! [[step]]
//! op = "insert"
//! id = 1
//! priority = 10
//!
//! [[step]]
//! op = "change"
//! id = 1
//! priority = 100
//!
//! [[step]]
//! op = "extract"
//!
//! [[step]]
//! op = "drain"
//! ```
//!
//! Steps run in order through a [`HeapHandle`].  Duplicate inserts are logged
//! and counted but do not stop the script.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use taskheap_kernel::{HeapHandle, KernelError, Task};
use tracing::{debug, warn};

/// One heap operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Insert { id: u64, priority: i64 },
    Change { id: u64, priority: i64 },
    Extract,
    /// Extract everything still resident.
    Drain,
}

#[derive(Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(input: &str) -> Result<Self> {
        toml::from_str(input).context("invalid replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Insert priorities 10..=50 as ids 1..=5, extract twice, raise id 1 to
    /// 100, extract twice.
    pub fn trace() -> Self {
        let mut steps: Vec<Step> = (1..=5)
            .map(|id| Step::Insert {
                id,
                priority: id as i64 * 10,
            })
            .collect();
        steps.extend([
            Step::Extract,
            Step::Extract,
            Step::Change {
                id: 1,
                priority: 100,
            },
            Step::Extract,
            Step::Extract,
        ]);
        Self { steps }
    }
}

/// Outcome of a replay.
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Tasks in the order they came out of the heap.
    pub extracted: Vec<Task>,
    /// Inserts rejected because the identifier was already resident.
    pub rejected: usize,
    /// Extract steps that found the heap empty.
    pub empty_extracts: usize,
    /// Tasks still resident after the last step.
    pub remaining: usize,
}

/// Run every step of `script` against `heap`.
pub async fn run_script(heap: &HeapHandle, script: &Script) -> Result<ReplayReport> {
    let mut report = ReplayReport::default();

    for (n, step) in script.steps.iter().enumerate() {
        debug!(step = n, ?step, "replaying step");
        match *step {
            Step::Insert { id, priority } => match heap.insert(Task::new(id, priority)).await {
                Ok(()) => {}
                Err(KernelError::DuplicateIdentifier { identifier }) => {
                    warn!(step = n, task_id = %identifier, "duplicate insert skipped");
                    report.rejected += 1;
                }
                Err(e) => return Err(e).context("heap insert failed"),
            },
            Step::Change { id, priority } => {
                heap.change_priority(id, priority)
                    .await
                    .context("heap change_priority failed")?;
            }
            Step::Extract => match heap.extract_max().await.context("heap extract failed")? {
                Some(task) => report.extracted.push(task),
                None => {
                    debug!(step = n, "extract on empty heap");
                    report.empty_extracts += 1;
                }
            },
            Step::Drain => {
                let drained = heap.drain().await.context("heap drain failed")?;
                report.extracted.extend(drained);
            }
        }
    }

    report.remaining = heap.len().await.context("heap len failed")?;
    Ok(report)
}

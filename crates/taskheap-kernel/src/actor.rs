//! Single-owner async access to a [`PriorityHeap`].
//!
//! A heap mutation updates both the slot vector and the identifier index, so
//! two operations must never interleave.  [`HeapHandle::spawn`] moves a heap
//! into a dedicated tokio task and returns a cloneable handle; every handle
//! method sends one command over an `mpsc` channel and waits for the reply
//! on a `oneshot`.  The worker applies commands strictly one at a time.
//!
//! # Worker lifecycle
//!
//! ```text
//! spawn  -->  Running  -->  Stopped   (shutdown() or all handles dropped)
//! ```
//!
//! Once the worker has stopped every handle method returns
//! [`KernelError::HeapClosed`].

use std::fmt::Debug;
use std::hash::Hash;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::HeapConfig;
use crate::error::{KernelError, Result};
use crate::heap::{PriorityHeap, Task};

/// Commands understood by the heap worker.
enum Command<I, P> {
    Insert {
        task: Task<I, P>,
        reply: oneshot::Sender<Result<()>>,
    },
    ExtractMax {
        reply: oneshot::Sender<Option<Task<I, P>>>,
    },
    ChangePriority {
        id: I,
        priority: P,
        reply: oneshot::Sender<()>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
    Peek {
        reply: oneshot::Sender<Option<Task<I, P>>>,
    },
    Drain {
        reply: oneshot::Sender<Vec<Task<I, P>>>,
    },
    Shutdown,
}

impl<I, P> Command<I, P> {
    fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::ExtractMax { .. } => "extract_max",
            Self::ChangePriority { .. } => "change_priority",
            Self::Len { .. } => "len",
            Self::Peek { .. } => "peek",
            Self::Drain { .. } => "drain",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Cloneable handle to a heap owned by a background tokio task.
pub struct HeapHandle<I = u64, P = i64> {
    tx: mpsc::Sender<Command<I, P>>,
}

impl<I, P> Clone for HeapHandle<I, P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<I, P> HeapHandle<I, P>
where
    I: Eq + Hash + Clone + Debug + Send + 'static,
    P: Ord + Clone + Debug + Send + 'static,
{
    /// Spawn the worker onto the current tokio runtime.
    ///
    /// The returned [`JoinHandle`] resolves once the worker has stopped.
    pub fn spawn(config: &HeapConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.effective_mailbox_capacity());
        let heap = PriorityHeap::with_config(config);

        let handle = tokio::spawn(async move {
            tracing::info!("heap worker started");
            let remaining = Self::worker_loop(heap, rx).await;
            tracing::info!(remaining, "heap worker stopped");
        });

        (Self { tx }, handle)
    }

    pub async fn insert(&self, task: Task<I, P>) -> Result<()> {
        self.request(|reply| Command::Insert { task, reply }).await?
    }

    /// `Ok(None)` means the heap is empty.
    pub async fn extract_max(&self) -> Result<Option<Task<I, P>>> {
        self.request(|reply| Command::ExtractMax { reply }).await
    }

    /// Unknown identifiers are ignored, as with
    /// [`PriorityHeap::change_priority`].
    pub async fn change_priority(&self, id: I, priority: P) -> Result<()> {
        self.request(|reply| Command::ChangePriority {
            id,
            priority,
            reply,
        })
        .await
    }

    pub async fn len(&self) -> Result<usize> {
        self.request(|reply| Command::Len { reply }).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Snapshot of the task that would be extracted next.
    pub async fn peek(&self) -> Result<Option<Task<I, P>>> {
        self.request(|reply| Command::Peek { reply }).await
    }

    /// Extract every resident task, highest priority first.
    pub async fn drain(&self) -> Result<Vec<Task<I, P>>> {
        self.request(|reply| Command::Drain { reply }).await
    }

    /// Ask the worker to stop after the commands already queued ahead of
    /// this one.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("heap shutdown requested");
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| KernelError::HeapClosed)
    }

    // -- Private helpers ----------------------------------------------------

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command<I, P>,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| KernelError::HeapClosed)?;
        rx.await.map_err(|_| KernelError::HeapClosed)
    }

    /// Apply commands until shutdown or until every sender is gone.  Returns
    /// the number of tasks still resident.
    async fn worker_loop(
        mut heap: PriorityHeap<I, P>,
        mut rx: mpsc::Receiver<Command<I, P>>,
    ) -> usize {
        while let Some(command) = rx.recv().await {
            tracing::debug!(command = command.name(), len = heap.len(), "heap command");

            // A dropped reply receiver only means the caller stopped waiting.
            match command {
                Command::Insert { task, reply } => {
                    let _ = reply.send(heap.insert(task));
                }
                Command::ExtractMax { reply } => {
                    let _ = reply.send(heap.extract_max());
                }
                Command::ChangePriority {
                    id,
                    priority,
                    reply,
                } => {
                    heap.change_priority(&id, priority);
                    let _ = reply.send(());
                }
                Command::Len { reply } => {
                    let _ = reply.send(heap.len());
                }
                Command::Peek { reply } => {
                    let _ = reply.send(heap.peek().cloned());
                }
                Command::Drain { reply } => {
                    let mut drained = Vec::with_capacity(heap.len());
                    while let Some(task) = heap.extract_max() {
                        drained.push(task);
                    }
                    let _ = reply.send(drained);
                }
                Command::Shutdown => break,
            }
        }
        heap.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TieBreak;

    #[tokio::test]
    async fn trace_through_handle() {
        let (heap, worker) = HeapHandle::<u64, i64>::spawn(&HeapConfig::default());

        for (id, priority) in [(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)] {
            heap.insert(Task::new(id, priority)).await.expect("insert");
        }

        assert_eq!(heap.extract_max().await.unwrap(), Some(Task::new(5, 50)));
        assert_eq!(heap.extract_max().await.unwrap(), Some(Task::new(4, 40)));

        heap.change_priority(1, 100).await.expect("change");
        assert_eq!(heap.peek().await.unwrap(), Some(Task::new(1, 100)));
        assert_eq!(heap.extract_max().await.unwrap(), Some(Task::new(1, 100)));
        assert_eq!(heap.extract_max().await.unwrap(), Some(Task::new(3, 30)));
        assert_eq!(heap.len().await.unwrap(), 1);

        heap.shutdown().await.expect("shutdown");
        worker.await.expect("worker exit");
    }

    #[tokio::test]
    async fn duplicate_insert_is_reported() {
        let (heap, worker) = HeapHandle::<u64, i64>::spawn(&HeapConfig::default());
        heap.insert(Task::new(7, 1)).await.expect("first insert");

        let result = heap.insert(Task::new(7, 2)).await;
        assert!(matches!(
            result,
            Err(KernelError::DuplicateIdentifier { .. })
        ));
        assert_eq!(heap.len().await.unwrap(), 1);

        drop(heap);
        worker.await.expect("worker exits once handles are dropped");
    }

    #[tokio::test]
    async fn drain_keeps_tie_break() {
        let config = HeapConfig {
            tie_break: TieBreak::Fifo,
            ..HeapConfig::default()
        };
        let (heap, _worker) = HeapHandle::<u64, i64>::spawn(&config);

        for id in [3, 1, 2] {
            heap.insert(Task::new(id, 0)).await.expect("insert");
        }
        let ids: Vec<u64> = heap.drain().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(heap.is_empty().await.unwrap());

        for id in [9, 8] {
            heap.insert(Task::new(id, 0)).await.expect("insert");
        }
        let ids: Vec<u64> = heap.drain().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![9, 8]);
    }

    #[tokio::test]
    async fn closed_worker_rejects_calls() {
        let (heap, worker) = HeapHandle::<u64, i64>::spawn(&HeapConfig::default());
        heap.shutdown().await.expect("shutdown");
        worker.await.expect("worker exit");

        assert_eq!(heap.len().await, Err(KernelError::HeapClosed));
        assert_eq!(
            heap.insert(Task::new(1, 1)).await,
            Err(KernelError::HeapClosed)
        );
        assert!(matches!(
            heap.shutdown().await,
            Err(KernelError::HeapClosed)
        ));
    }
}

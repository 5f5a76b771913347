//! Integration tests for the taskheap-kernel crate.
//!
//! These tests drive the heap and its async handle through the public API
//! only.

use std::collections::HashSet;

use taskheap_kernel::{HeapConfig, HeapHandle, KernelError, PriorityHeap, Task, TieBreak};

// ═══════════════════════════════════════════════════════════════════════
//  PriorityHeap
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn heap_exhaustion_returns_every_task_once() {
    let mut heap = PriorityHeap::new();
    let priorities = [5, -3, 12, 12, 0, 7, -3, 99, 1, 5];
    for (id, priority) in priorities.iter().enumerate() {
        heap.insert(Task::new(id as u64, *priority as i64)).unwrap();
    }

    let mut seen = HashSet::new();
    let mut last = i64::MAX;
    while let Some(task) = heap.extract_max() {
        assert!(task.priority <= last, "priorities must not increase");
        last = task.priority;
        assert!(seen.insert(task.id), "task {} returned twice", task.id);
    }

    assert_eq!(seen.len(), priorities.len());
    assert_eq!(heap.extract_max(), None);
    assert_eq!(heap.extract_max(), None);
    assert!(heap.is_empty());
}

#[test]
fn heap_reusable_after_exhaustion() {
    let mut heap = PriorityHeap::new();
    for round in 0..3i64 {
        for id in 0..4u64 {
            heap.insert(Task::new(id, round * 10 + id as i64)).unwrap();
        }
        heap.change_priority(&0, 1_000);
        assert_eq!(heap.extract_max().map(|t| t.id), Some(0));
        assert_eq!(heap.len(), 3);
        while heap.extract_max().is_some() {}
    }
}

#[test]
fn heap_accepts_uuid_identifiers() {
    let mut heap: PriorityHeap<uuid::Uuid, i32> = PriorityHeap::new();
    let low = uuid::Uuid::now_v7();
    let high = uuid::Uuid::now_v7();

    heap.insert(Task::new(low, 1)).unwrap();
    heap.insert(Task::new(high, 2)).unwrap();
    heap.change_priority(&low, 3);

    assert_eq!(heap.priority_of(&low), Some(&3));
    assert_eq!(heap.extract_max().map(|t| t.id), Some(low));
    assert_eq!(heap.extract_max().map(|t| t.id), Some(high));
}

#[test]
fn task_json_shape() {
    let task: Task = Task::new(4, -2);
    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json, serde_json::json!({ "id": 4, "priority": -2 }));

    let back: Task = serde_json::from_value(json).unwrap();
    assert_eq!(back, task);
}

// ═══════════════════════════════════════════════════════════════════════
//  HeapHandle
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn handle_concurrent_inserts_are_all_retained() {
    let config = HeapConfig {
        mailbox_capacity: 4,
        ..HeapConfig::default()
    };
    let (heap, worker) = HeapHandle::<u64, i64>::spawn(&config);

    let mut producers = Vec::new();
    for producer in 0..8u64 {
        let heap = heap.clone();
        producers.push(tokio::spawn(async move {
            for n in 0..25u64 {
                let id = producer * 100 + n;
                heap.insert(Task::new(id, (id % 17) as i64)).await.unwrap();
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(heap.len().await.unwrap(), 200);

    let drained = heap.drain().await.unwrap();
    assert_eq!(drained.len(), 200);
    assert!(drained.windows(2).all(|w| w[0].priority >= w[1].priority));
    let ids: HashSet<u64> = drained.iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 200);

    heap.shutdown().await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn handle_concurrent_priority_changes() {
    let (heap, worker) = HeapHandle::<u64, i64>::spawn(&HeapConfig::default());
    for id in 0..50u64 {
        heap.insert(Task::new(id, 0)).await.unwrap();
    }

    let mut changers = Vec::new();
    for id in 0..50u64 {
        let heap = heap.clone();
        changers.push(tokio::spawn(async move {
            heap.change_priority(id, id as i64).await.unwrap();
        }));
    }
    for changer in changers {
        changer.await.unwrap();
    }

    let order: Vec<u64> = heap.drain().await.unwrap().into_iter().map(|t| t.id).collect();
    let expected: Vec<u64> = (0..50u64).rev().collect();
    assert_eq!(order, expected);

    drop(heap);
    worker.await.unwrap();
}

#[tokio::test]
async fn handle_fifo_and_unknown_ids() {
    let config = HeapConfig {
        tie_break: TieBreak::Fifo,
        ..HeapConfig::default()
    };
    let (heap, _worker) = HeapHandle::<String, u8>::spawn(&config);

    for name in ["alpha", "beta", "gamma"] {
        heap.insert(Task::new(name.to_string(), 1)).await.unwrap();
    }
    heap.change_priority("missing".to_string(), 200).await.unwrap();
    assert_eq!(heap.len().await.unwrap(), 3);

    let dup = heap.insert(Task::new("beta".to_string(), 9)).await;
    assert_eq!(
        dup,
        Err(KernelError::DuplicateIdentifier {
            identifier: "\"beta\"".to_string()
        })
    );

    let names: Vec<String> = heap.drain().await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    assert_eq!(heap.extract_max().await.unwrap(), None);
}

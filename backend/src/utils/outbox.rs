//! Outbox for the in-memory task queue.
//!
//! The bundled binary has no mail workers behind its queue. This drains it
//! on an interval and logs each task in place of delivery, so queued tasks
//! do not accumulate for the life of the process.

use std::time::Duration;

use keyward_adapters::InMemoryTaskQueue;
use tokio::task::JoinHandle;
use tracing::info;

/// Drains every queued task and returns how many were flushed.
pub async fn flush(queue: &InMemoryTaskQueue) -> usize {
    let tasks = queue.drain().await;
    for task in &tasks {
        // payloads carry bearer tokens and are never logged
        info!(kind = %task.kind, enqueued_at = %task.enqueued_at, "Flushed task without a worker");
    }
    tasks.len()
}

pub fn spawn(queue: InMemoryTaskQueue, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            flush(&queue).await;
        }
    })
}

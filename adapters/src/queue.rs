//! Task queue implementations.
//!
//! `InMemoryTaskQueue` records every delivered task so callers can inspect
//! what was enqueued; `FailingTaskQueue` refuses every task and stands in for
//! an unreachable broker.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{TaskKind, TaskQueue};

#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub kind: TaskKind,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskQueue {
    tasks: Arc<Mutex<Vec<QueuedTask>>>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tasks(&self) -> Vec<QueuedTask> {
        self.tasks.lock().await.clone()
    }

    /// Removes and returns every queued task, oldest first.
    pub async fn drain(&self) -> Vec<QueuedTask> {
        std::mem::take(&mut *self.tasks.lock().await)
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue(&self, kind: TaskKind, payload: serde_json::Value) -> bool {
        self.tasks.lock().await.push(QueuedTask {
            kind,
            payload,
            enqueued_at: Utc::now(),
        });
        debug!("Enqueued {} task", kind);
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTaskQueue;

#[async_trait]
impl TaskQueue for FailingTaskQueue {
    async fn enqueue(&self, kind: TaskKind, _payload: serde_json::Value) -> bool {
        debug!("Refusing {} task", kind);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_queue_records_tasks() {
        let queue = InMemoryTaskQueue::new();
        let delivered = queue
            .enqueue(TaskKind::VerificationEmail, json!({ "email": "a@example.com" }))
            .await;
        assert!(delivered);

        let tasks = queue.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].kind, TaskKind::VerificationEmail);
        assert_eq!(tasks[0].payload["email"], "a@example.com");

        assert_eq!(queue.drain().await.len(), 1);
        assert!(queue.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_queue_rejects() {
        let queue = FailingTaskQueue;
        assert!(!queue.enqueue(TaskKind::PasswordRecoveryEmail, json!({})).await);
    }
}

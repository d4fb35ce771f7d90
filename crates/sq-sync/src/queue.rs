//! Explicit queue for fire-and-forget sync work
//!
//! Callers enqueue tasks as they mutate local state and drain the queue
//! opportunistically (page idle, navigation, sign-in). A task that keeps
//! failing is retried across drains up to [`MAX_SYNC_ATTEMPTS`] and then
//! dropped with a warning; local state is never blocked on it.

use std::collections::VecDeque;

use sq_core::Tool;
use tracing::warn;

use crate::remote::{AuthProvider, RemoteStore};
use crate::sync::{SyncOutcome, Synchronizer};

/// Failures before a task is dropped.
pub const MAX_SYNC_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub enum SyncTask {
    Identity,
    CurrentProject,
    Event {
        tool: Tool,
        session_id: String,
        data: serde_json::Value,
    },
}

impl SyncTask {
    fn describe(&self) -> &'static str {
        match self {
            SyncTask::Identity => "identity",
            SyncTask::CurrentProject => "current-project",
            SyncTask::Event { .. } => "session-event",
        }
    }
}

#[derive(Debug)]
struct QueuedTask {
    task: SyncTask,
    attempts: u32,
}

#[derive(Debug, Default)]
pub struct SyncQueue {
    pending: VecDeque<QueuedTask>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    /// Tasks that synced or were legitimately skipped.
    pub completed: u32,
    /// Tasks re-queued for the next drain.
    pub deferred: u32,
    /// Tasks dropped after exhausting their attempts.
    pub dropped: u32,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, task: SyncTask) {
        self.pending.push_back(QueuedTask { task, attempts: 0 });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every queued task once. Deferred tasks go back on the queue
    /// until their attempts run out.
    pub async fn drain<R: RemoteStore, A: AuthProvider>(
        &mut self,
        sync: &Synchronizer<R, A>,
    ) -> DrainStats {
        let mut stats = DrainStats::default();
        let batch: Vec<QueuedTask> = self.pending.drain(..).collect();

        for mut queued in batch {
            let outcome = match &queued.task {
                SyncTask::Identity => sync.sync_identity().await,
                SyncTask::CurrentProject => sync.sync_current_project_auto().await,
                SyncTask::Event {
                    tool,
                    session_id,
                    data,
                } => sync.log_remote_event(*tool, session_id, data.clone()).await,
            };

            match outcome {
                SyncOutcome::Synced | SyncOutcome::Skipped => stats.completed += 1,
                SyncOutcome::Deferred => {
                    queued.attempts += 1;
                    if queued.attempts >= MAX_SYNC_ATTEMPTS {
                        warn!(
                            task = queued.task.describe(),
                            attempts = queued.attempts,
                            "dropping sync task after repeated failures"
                        );
                        stats.dropped += 1;
                    } else {
                        stats.deferred += 1;
                        self.pending.push_back(queued);
                    }
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{AuthUser, MemoryRemoteStore, StaticAuthProvider};
    use serde_json::json;
    use sq_session::{IdentityDraft, IdentityStore, PhasePayload, ProjectJournal, ProjectUpdate, SessionStore};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn seeded_sync(
        dir: &std::path::Path,
        remote: Arc<MemoryRemoteStore>,
    ) -> Synchronizer<Arc<MemoryRemoteStore>, StaticAuthProvider> {
        let store = SessionStore::new(dir.to_path_buf());
        IdentityStore::new(store.clone()).get_or_create(&IdentityDraft {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        });
        ProjectJournal::new(store.clone()).create_or_update(ProjectUpdate::new(
            Tool::QuickEstimate,
            PhasePayload::Opaque(json!({})),
        ));
        Synchronizer::new(
            remote,
            StaticAuthProvider::new(AuthUser {
                id: "auth-1".to_string(),
                email: None,
            }),
            store,
        )
    }

    #[tokio::test]
    async fn test_drain_completes_healthy_tasks() {
        let td = tempdir().unwrap();
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = seeded_sync(td.path(), remote.clone());

        let mut queue = SyncQueue::new();
        queue.enqueue(SyncTask::Identity);
        queue.enqueue(SyncTask::CurrentProject);
        queue.enqueue(SyncTask::Event {
            tool: Tool::AiAssistant,
            session_id: "chat-1".to_string(),
            data: json!({}),
        });

        let stats = queue.drain(&sync).await;
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.deferred, 0);
        assert_eq!(stats.dropped, 0);
        assert!(queue.is_empty());
        assert_eq!(remote.insert_count(), 1);
        assert_eq!(remote.event_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_task_is_requeued_then_succeeds() {
        let td = tempdir().unwrap();
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = seeded_sync(td.path(), remote.clone());

        remote.inject_failures(1);
        let mut queue = SyncQueue::new();
        queue.enqueue(SyncTask::CurrentProject);

        let stats = queue.drain(&sync).await;
        assert_eq!(stats.deferred, 1);
        assert_eq!(queue.len(), 1);

        let stats = queue.drain(&sync).await;
        assert_eq!(stats.completed, 1);
        assert!(queue.is_empty());
        assert_eq!(remote.insert_count(), 1);
    }

    #[tokio::test]
    async fn test_task_dropped_after_bounded_retries() {
        let td = tempdir().unwrap();
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = seeded_sync(td.path(), remote.clone());

        remote.inject_failures(MAX_SYNC_ATTEMPTS);
        let mut queue = SyncQueue::new();
        queue.enqueue(SyncTask::Event {
            tool: Tool::AiAssessment,
            session_id: "chat-2".to_string(),
            data: json!({}),
        });

        let mut dropped = 0;
        for _ in 0..MAX_SYNC_ATTEMPTS {
            dropped += queue.drain(&sync).await.dropped;
        }
        assert_eq!(dropped, 1);
        assert!(queue.is_empty());
        assert_eq!(remote.event_count(), 0);
    }
}

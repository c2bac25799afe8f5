//! In-process job queue.
//!
//! Uploads enqueue an `OptimizationJob`; a dispatcher task pulls jobs off an
//! unbounded channel and runs each through the pipeline on its own task,
//! holding a semaphore permit so at most `max_concurrent` run at once.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{SessionStore, StoreError};
use crate::models::session::SessionUpdate;
use crate::optimization::extractor::FileKind;
use crate::optimization::pipeline::Pipeline;

pub const INTERRUPTED_MESSAGE: &str = "interrupted by server restart";

/// Everything the pipeline needs to process one upload.
#[derive(Debug, Clone)]
pub struct OptimizationJob {
    pub session_id: Uuid,
    pub upload_path: PathBuf,
    pub file_kind: FileKind,
    pub job_description: String,
}

#[derive(Debug, Error)]
#[error("job queue is shut down")]
pub struct QueueClosed;

#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<OptimizationJob>,
}

impl JobQueue {
    /// Spawns the dispatcher. The returned handle finishes once every
    /// `JobQueue` clone has been dropped and the channel drains.
    pub fn start(pipeline: Arc<Pipeline>, max_concurrent: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<OptimizationJob>();
        let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));

        let dispatcher = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let permit = match permits.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    pipeline.run(job).await;
                    drop(permit);
                });
            }
            info!("Job queue dispatcher stopped");
        });

        (Self { sender }, dispatcher)
    }

    /// Never waits. Fails only after the dispatcher has stopped.
    pub fn enqueue(&self, job: OptimizationJob) -> Result<(), QueueClosed> {
        self.sender.send(job).map_err(|_| QueueClosed)
    }
}

/// Marks every unfinished session as failed. Run once at startup, before the
/// queue accepts work, since no job survives a restart.
pub async fn recover_interrupted(store: &dyn SessionStore) -> Result<usize, StoreError> {
    let unfinished = store.list_unfinished().await?;
    let mut recovered = 0;

    for session in unfinished {
        let update = SessionUpdate::Failed {
            error_message: INTERRUPTED_MESSAGE.to_string(),
        };
        match store.apply(session.id, update).await {
            Ok(()) => recovered += 1,
            Err(e) => warn!(session_id = %session.id, "Could not mark session as interrupted: {e}"),
        }
    }

    if recovered > 0 {
        info!("Marked {recovered} interrupted session(s) as failed");
    }
    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::db::memory::MemorySessionStore;
    use crate::llm_client::scripted::{Reply, ScriptedModel};
    use crate::models::session::{OptimizationSession, SessionStatus};
    use crate::storage::{LocalArtifactStore, UploadStaging};

    const JD: &str = "Backend engineer, Rust and PostgreSQL, at least three years of production experience.";

    async fn wait_for_terminal(store: &MemorySessionStore, id: Uuid) -> OptimizationSession {
        for _ in 0..200 {
            if let Some(session) = store.get(id).await.unwrap() {
                if session.status.is_terminal() {
                    return session;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session {id} never reached a terminal state");
    }

    #[tokio::test]
    async fn test_enqueued_job_runs_to_a_terminal_state() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemorySessionStore::new());
        let staging = UploadStaging::new(dir.path().join("uploads"));
        let pipeline = Arc::new(Pipeline::new(
            store.clone(),
            Arc::new(ScriptedModel::new(vec![Reply::Unavailable])),
            Arc::new(LocalArtifactStore::new(dir.path().join("output"))),
            staging.clone(),
        ));
        let (queue, _dispatcher) = JobQueue::start(pipeline, 2);

        let id = Uuid::new_v4();
        let upload_path = staging.stage(id, "resume.pdf", b"%PDF-broken").await.unwrap();
        store
            .insert(&OptimizationSession::new(id, "resume.pdf".to_string(), JD.to_string()))
            .await
            .unwrap();
        queue
            .enqueue(OptimizationJob {
                session_id: id,
                upload_path,
                file_kind: FileKind::Pdf,
                job_description: JD.to_string(),
            })
            .unwrap();

        let session = wait_for_terminal(&store, id).await;
        assert_eq!(session.status, SessionStatus::Failed);
    }

    #[tokio::test]
    async fn test_enqueue_after_dispatcher_stops_fails() {
        let dir = TempDir::new().unwrap();
        let pipeline = Arc::new(Pipeline::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(ScriptedModel::default()),
            Arc::new(LocalArtifactStore::new(dir.path().join("output"))),
            UploadStaging::new(dir.path().join("uploads")),
        ));
        let (queue, dispatcher) = JobQueue::start(pipeline, 1);
        dispatcher.abort();
        let _ = dispatcher.await;

        let result = queue.enqueue(OptimizationJob {
            session_id: Uuid::new_v4(),
            upload_path: dir.path().join("missing.pdf"),
            file_kind: FileKind::Pdf,
            job_description: JD.to_string(),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recovery_fails_only_unfinished_sessions() {
        let store = MemorySessionStore::new();

        let waiting = OptimizationSession::new(Uuid::new_v4(), "a.pdf".to_string(), JD.to_string());
        store.insert(&waiting).await.unwrap();

        let running = OptimizationSession::new(Uuid::new_v4(), "b.pdf".to_string(), JD.to_string());
        store.insert(&running).await.unwrap();
        store.apply(running.id, SessionUpdate::Analyzing).await.unwrap();

        let done = OptimizationSession::new(Uuid::new_v4(), "c.pdf".to_string(), JD.to_string());
        store.insert(&done).await.unwrap();
        store
            .apply(
                done.id,
                SessionUpdate::Failed {
                    error_message: "earlier failure".to_string(),
                },
            )
            .await
            .unwrap();

        let recovered = recover_interrupted(&store).await.unwrap();
        assert_eq!(recovered, 2);

        for id in [waiting.id, running.id] {
            let session = store.get(id).await.unwrap().unwrap();
            assert_eq!(session.status, SessionStatus::Failed);
            assert_eq!(session.error_message.as_deref(), Some(INTERRUPTED_MESSAGE));
        }
        let untouched = store.get(done.id).await.unwrap().unwrap();
        assert_eq!(untouched.error_message.as_deref(), Some("earlier failure"));
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{SessionStore, StoreError};
use crate::models::session::{OptimizationSession, SessionStatus, SessionUpdate};

/// In-process store with the same transition rules as Postgres.
/// Also remembers every status each session passed through.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, OptimizationSession>>,
    history: RwLock<HashMap<Uuid, Vec<SessionStatus>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn history(&self, id: Uuid) -> Vec<SessionStatus> {
        self.history
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &OptimizationSession) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        self.history
            .write()
            .await
            .insert(session.id, vec![session.status]);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<OptimizationSession>, StoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn apply(&self, id: Uuid, update: SessionUpdate) -> Result<(), StoreError> {
        let target = update.target_status();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !session.status.can_transition_to(target) {
            return Err(StoreError::InvalidTransition {
                id,
                from: session.status,
                to: target,
            });
        }
        update.apply_to(session);
        self.history
            .write()
            .await
            .entry(id)
            .or_default()
            .push(target);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn list(&self, limit: i64, skip: i64) -> Result<Vec<OptimizationSession>, StoreError> {
        let mut all: Vec<_> = self.sessions.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_unfinished(&self) -> Result<Vec<OptimizationSession>, StoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| !s.status.is_terminal())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> OptimizationSession {
        OptimizationSession::new(Uuid::new_v4(), "cv.docx".to_string(), "j".repeat(80))
    }

    #[tokio::test]
    async fn test_rejects_out_of_order_transition() {
        let store = MemorySessionStore::new();
        let s = session();
        store.insert(&s).await.unwrap();

        let err = store
            .apply(
                s.id,
                SessionUpdate::Completed {
                    file_paths: Default::default(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                from: SessionStatus::Uploaded,
                to: SessionStatus::Completed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_is_terminal() {
        let store = MemorySessionStore::new();
        let s = session();
        store.insert(&s).await.unwrap();
        store
            .apply(
                s.id,
                SessionUpdate::Failed {
                    error_message: "boom".into(),
                },
            )
            .await
            .unwrap();

        assert!(store.apply(s.id, SessionUpdate::Analyzing).await.is_err());
        assert_eq!(
            store.history(s.id).await,
            vec![SessionStatus::Uploaded, SessionStatus::Failed]
        );
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let store = MemorySessionStore::new();
        let mut ids = Vec::new();
        for offset in 0..3 {
            let mut s = session();
            s.created_at += chrono::Duration::seconds(offset);
            ids.push(s.id);
            store.insert(&s).await.unwrap();
        }

        let page = store.list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2]);
        assert_eq!(page[1].id, ids[1]);

        let rest = store.list(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, ids[0]);
    }

    #[tokio::test]
    async fn test_apply_to_missing_session_is_not_found() {
        let store = MemorySessionStore::new();
        let err = store
            .apply(Uuid::new_v4(), SessionUpdate::Analyzing)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}

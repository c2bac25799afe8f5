//! Session persistence.
//!
//! `SessionStore` is the seam between the pipeline/handlers and the database.
//! Production uses `PgSessionStore`; tests use the in-memory store.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::session::{OptimizationSession, SessionStatus, SessionUpdate};

#[cfg(test)]
pub mod memory;
pub mod sessions;

pub use sessions::PgSessionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("session {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("stored session {id} is unreadable: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

/// Persistence for optimization sessions. One record per upload.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &OptimizationSession) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<OptimizationSession>, StoreError>;

    /// Applies a status change. Fails with `InvalidTransition` unless the stored
    /// status is a legal predecessor of the update's target.
    async fn apply(&self, id: Uuid, update: SessionUpdate) -> Result<(), StoreError>;

    /// Returns true if a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Newest first.
    async fn list(&self, limit: i64, skip: i64) -> Result<Vec<OptimizationSession>, StoreError>;

    /// Sessions not yet in a terminal state.
    async fn list_unfinished(&self) -> Result<Vec<OptimizationSession>, StoreError>;
}

/// Creates a PostgreSQL connection pool and runs pending migrations.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("PostgreSQL connection pool established, migrations applied");
    Ok(pool)
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::{SessionStore, StoreError};
use crate::models::analysis::AnalysisResult;
use crate::models::resume::OptimizedResume;
use crate::models::session::{
    ContentSource, FilePaths, OptimizationSession, SessionStatus, SessionUpdate,
};

/// Row shape of `optimization_sessions`. Enum columns are stored as text.
#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    original_filename: String,
    extracted_text: String,
    job_description: String,
    analysis: Option<Json<AnalysisResult>>,
    optimized_content: Option<Json<OptimizedResume>>,
    analysis_source: Option<String>,
    optimization_source: Option<String>,
    status: String,
    error_message: Option<String>,
    file_paths: Option<Json<FilePaths>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for OptimizationSession {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |reason: String| StoreError::Corrupt { id, reason };

        let status = row.status.parse::<SessionStatus>().map_err(corrupt)?;
        let analysis_source = row
            .analysis_source
            .map(|s| s.parse::<ContentSource>())
            .transpose()
            .map_err(corrupt)?;
        let optimization_source = row
            .optimization_source
            .map(|s| s.parse::<ContentSource>())
            .transpose()
            .map_err(corrupt)?;

        Ok(OptimizationSession {
            id,
            original_filename: row.original_filename,
            extracted_text: row.extracted_text,
            job_description: row.job_description,
            analysis: row.analysis.map(|j| j.0),
            optimized_content: row.optimized_content.map(|j| j.0),
            analysis_source,
            optimization_source,
            status,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
            file_paths: row.file_paths.map(|j| j.0),
        })
    }
}

/// Postgres-backed session store.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_list(statuses: &[SessionStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, session: &OptimizationSession) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO optimization_sessions
                (id, original_filename, extracted_text, job_description, analysis,
                 optimized_content, analysis_source, optimization_source, status,
                 error_message, file_paths, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(session.id)
        .bind(&session.original_filename)
        .bind(&session.extracted_text)
        .bind(&session.job_description)
        .bind(session.analysis.as_ref().map(Json))
        .bind(session.optimized_content.as_ref().map(Json))
        .bind(session.analysis_source.map(|s| s.as_str()))
        .bind(session.optimization_source.map(|s| s.as_str()))
        .bind(session.status.as_str())
        .bind(&session.error_message)
        .bind(session.file_paths.as_ref().map(Json))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<OptimizationSession>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM optimization_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(OptimizationSession::try_from).transpose()
    }

    async fn apply(&self, id: Uuid, update: SessionUpdate) -> Result<(), StoreError> {
        let target = update.target_status();
        let allowed_from = status_list(target.predecessors());

        // Every statement is guarded on the current status so a record can
        // only move along the state machine, never backwards or out of a
        // terminal state.
        let result = match update {
            SessionUpdate::Analyzing => {
                sqlx::query(
                    r#"
                    UPDATE optimization_sessions
                    SET status = $2, updated_at = now()
                    WHERE id = $1 AND status = ANY($3)
                    "#,
                )
                .bind(id)
                .bind(target.as_str())
                .bind(&allowed_from)
                .execute(&self.pool)
                .await?
            }
            SessionUpdate::Optimized {
                extracted_text,
                analysis,
                analysis_source,
                optimized_content,
                optimization_source,
            } => {
                sqlx::query(
                    r#"
                    UPDATE optimization_sessions
                    SET status = $2, extracted_text = $4, analysis = $5,
                        analysis_source = $6, optimized_content = $7,
                        optimization_source = $8, updated_at = now()
                    WHERE id = $1 AND status = ANY($3)
                    "#,
                )
                .bind(id)
                .bind(target.as_str())
                .bind(&allowed_from)
                .bind(&extracted_text)
                .bind(Json(&analysis))
                .bind(analysis_source.as_str())
                .bind(Json(&optimized_content))
                .bind(optimization_source.as_str())
                .execute(&self.pool)
                .await?
            }
            SessionUpdate::Completed { file_paths } => {
                sqlx::query(
                    r#"
                    UPDATE optimization_sessions
                    SET status = $2, file_paths = $4, updated_at = now()
                    WHERE id = $1 AND status = ANY($3)
                    "#,
                )
                .bind(id)
                .bind(target.as_str())
                .bind(&allowed_from)
                .bind(Json(&file_paths))
                .execute(&self.pool)
                .await?
            }
            SessionUpdate::Failed { error_message } => {
                sqlx::query(
                    r#"
                    UPDATE optimization_sessions
                    SET status = $2, error_message = $4, updated_at = now()
                    WHERE id = $1 AND status = ANY($3)
                    "#,
                )
                .bind(id)
                .bind(target.as_str())
                .bind(&allowed_from)
                .bind(&error_message)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get(id).await? {
            None => Err(StoreError::NotFound(id)),
            Some(current) => Err(StoreError::InvalidTransition {
                id,
                from: current.status,
                to: target,
            }),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM optimization_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: i64, skip: i64) -> Result<Vec<OptimizationSession>, StoreError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT * FROM optimization_sessions
            ORDER BY created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OptimizationSession::try_from).collect()
    }

    async fn list_unfinished(&self) -> Result<Vec<OptimizationSession>, StoreError> {
        let unfinished = status_list(SessionStatus::Failed.predecessors());
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM optimization_sessions WHERE status = ANY($1) ORDER BY created_at",
        )
        .bind(&unfinished)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OptimizationSession::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, source: Option<&str>) -> SessionRow {
        SessionRow {
            id: Uuid::new_v4(),
            original_filename: "cv.pdf".to_string(),
            extracted_text: String::new(),
            job_description: "j".repeat(60),
            analysis: None,
            optimized_content: None,
            analysis_source: source.map(str::to_string),
            optimization_source: None,
            status: status.to_string(),
            error_message: None,
            file_paths: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_session() {
        let session = OptimizationSession::try_from(row("analyzing", Some("fallback"))).unwrap();
        assert_eq!(session.status, SessionStatus::Analyzing);
        assert_eq!(session.analysis_source, Some(ContentSource::Fallback));
    }

    #[test]
    fn test_unknown_status_is_reported_as_corrupt() {
        let err = OptimizationSession::try_from(row("archived", None)).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_status_list_for_failed_covers_non_terminal_states() {
        assert_eq!(
            status_list(SessionStatus::Failed.predecessors()),
            vec!["uploaded", "analyzing", "optimized"]
        );
    }
}

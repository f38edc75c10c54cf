use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::{AssessmentId, AttemptRecord, UserId};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// An attempt record together with its store-assigned row id.
#[derive(Debug, Clone)]
pub struct AttemptRow {
    pub id: i64,
    pub record: AttemptRecord,
}

impl AttemptRow {
    #[must_use]
    pub fn new(id: i64, record: AttemptRecord) -> Self {
        Self { id, record }
    }
}

/// Repository contract for per-user attempt history.
///
/// The history is append-only: rows are never overwritten or deleted here.
/// Eviction, if any, is an administrative concern outside this engine.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append a finished attempt to the user's history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(
        &self,
        user_id: &UserId,
        record: &AttemptRecord,
    ) -> Result<i64, StorageError>;

    /// Fetch a single attempt by row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_attempt(&self, id: i64) -> Result<AttemptRecord, StorageError>;

    /// List attempts for `(user, assessment)`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_attempts(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
        completed_from: Option<DateTime<Utc>>,
        completed_until: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError>;

    /// Most recent attempt per assessment, for listing pages.
    ///
    /// Assessments the user never attempted are simply absent from the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_latest_rows(
        &self,
        user_id: &UserId,
        assessment_ids: &[AssessmentId],
    ) -> Result<Vec<AttemptRow>, StorageError>;
}

struct StoredAttempt {
    id: i64,
    user_id: UserId,
    record: AttemptRecord,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    attempts: Arc<Mutex<Vec<StoredAttempt>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(
        &self,
        user_id: &UserId,
        record: &AttemptRecord,
    ) -> Result<i64, StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard.len() as i64 + 1;
        guard.push(StoredAttempt {
            id,
            user_id: user_id.clone(),
            record: record.clone(),
        });
        Ok(id)
    }

    async fn get_attempt(&self, id: i64) -> Result<AttemptRecord, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|stored| stored.id == id)
            .map(|stored| stored.record.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_attempts(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
        completed_from: Option<DateTime<Utc>>,
        completed_until: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<AttemptRow> = guard
            .iter()
            .filter(|stored| &stored.user_id == user_id)
            .filter(|stored| stored.record.assessment_id() == assessment_id)
            .filter(|stored| {
                completed_from.is_none_or(|from| stored.record.completed_at() >= from)
            })
            .filter(|stored| {
                completed_until.is_none_or(|until| stored.record.completed_at() <= until)
            })
            .map(|stored| AttemptRow::new(stored.id, stored.record.clone()))
            .collect();

        rows.sort_by(|a, b| {
            b.record
                .completed_at()
                .cmp(&a.record.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn list_latest_rows(
        &self,
        user_id: &UserId,
        assessment_ids: &[AssessmentId],
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut out = Vec::new();
        for assessment_id in assessment_ids {
            let latest = guard
                .iter()
                .filter(|stored| &stored.user_id == user_id)
                .filter(|stored| stored.record.assessment_id() == assessment_id)
                .max_by(|a, b| {
                    a.record
                        .completed_at()
                        .cmp(&b.record.completed_at())
                        .then(a.id.cmp(&b.id))
                });
            if let Some(stored) = latest {
                out.push(AttemptRow::new(stored.id, stored.record.clone()));
            }
        }
        Ok(out)
    }
}

/// Aggregates attempt persistence behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            attempts: Arc::new(InMemoryRepository::new()),
        }
    }
}

use chrono::{DateTime, Duration, Utc};

use exam_core::model::{AssessmentId, AttemptRecord, UserId};
use storage::repository::{AttemptRepository, AttemptRow};

use crate::error::SessionError;

/// Storage-backed attempt history queries.
pub(crate) struct AttemptQueries;

impl AttemptQueries {
    /// List attempts completed within the last `days`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn list_recent_rows(
        user_id: &UserId,
        assessment_id: &AssessmentId,
        attempts: &dyn AttemptRepository,
        now: DateTime<Utc>,
        days: i64,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, SessionError> {
        let completed_from = now.checked_sub_signed(Duration::days(days));
        Ok(attempts
            .list_attempts(user_id, assessment_id, completed_from, Some(now), limit)
            .await?)
    }

    /// Latest attempt per assessment for the given ids.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn list_latest_rows(
        user_id: &UserId,
        assessment_ids: &[AssessmentId],
        attempts: &dyn AttemptRepository,
    ) -> Result<Vec<AttemptRow>, SessionError> {
        Ok(attempts.list_latest_rows(user_id, assessment_ids).await?)
    }

    /// Fetch a single attempt by row id.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn get_attempt(
        id: i64,
        attempts: &dyn AttemptRepository,
    ) -> Result<AttemptRecord, SessionError> {
        Ok(attempts.get_attempt(id).await?)
    }
}

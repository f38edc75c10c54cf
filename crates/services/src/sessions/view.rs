use chrono::{DateTime, Utc};
use std::sync::Arc;

use exam_core::model::{AssessmentId, AttemptRecord, UserId};
use storage::repository::{AttemptRepository, AttemptRow};

use super::queries::AttemptQueries;
use crate::Clock;
use crate::error::SessionError;

/// Storage identifier for a persisted attempt.
///
/// NOTE: This is currently `i64` to match `SQLite` row IDs.
pub type AttemptId = i64;

/// Presentation-agnostic list item for an attempt.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI may format timestamps (e.g., relative time, locale) as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub completed_at: DateTime<Utc>,

    pub score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub empty: u32,
    pub total_questions: u32,
}

/// Latest attempt per assessment, preserving assessment identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptAssessmentItem {
    pub assessment_id: AssessmentId,
    pub id: AttemptId,
    pub completed_at: DateTime<Utc>,

    pub score: u32,
    pub correct: u32,
    pub total_questions: u32,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_record(id: AttemptId, record: &AttemptRecord) -> Self {
        Self {
            id,
            completed_at: record.completed_at(),
            score: record.score(),
            correct: record.correct(),
            wrong: record.wrong(),
            empty: record.empty(),
            total_questions: record.total_questions(),
        }
    }
}

impl AttemptAssessmentItem {
    #[must_use]
    pub fn from_row(row: &AttemptRow) -> Self {
        Self {
            assessment_id: row.record.assessment_id().clone(),
            id: row.id,
            completed_at: row.record.completed_at(),
            score: row.record.score(),
            correct: row.record.correct(),
            total_questions: row.record.total_questions(),
        }
    }
}

/// Presentation-facing attempt history facade that hides repositories and
/// time from the UI.
///
/// This service owns:
/// - the time source (`Clock`)
/// - repository access
///
/// It does **not** own UI formatting.
#[derive(Clone)]
pub struct AttemptHistoryService {
    clock: Clock,
    attempts: Arc<dyn AttemptRepository>,
}

impl AttemptHistoryService {
    #[must_use]
    pub fn new(clock: Clock, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { clock, attempts }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(storage::repository::InMemoryRepository::new()),
        )
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Load recent attempts for one assessment, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_recent_attempts(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
        days: i64,
        limit: u32,
    ) -> Result<Vec<AttemptListItem>, SessionError> {
        let now = self.clock.now();
        let rows = AttemptQueries::list_recent_rows(
            user_id,
            assessment_id,
            self.attempts.as_ref(),
            now,
            days,
            limit,
        )
        .await?;

        Ok(rows
            .iter()
            .map(|row| AttemptListItem::from_record(row.id, &row.record))
            .collect())
    }

    /// Load the latest attempt per assessment.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_latest_by_assessment(
        &self,
        user_id: &UserId,
        assessment_ids: &[AssessmentId],
    ) -> Result<Vec<AttemptAssessmentItem>, SessionError> {
        let rows =
            AttemptQueries::list_latest_rows(user_id, assessment_ids, self.attempts.as_ref())
                .await?;
        Ok(rows.iter().map(AttemptAssessmentItem::from_row).collect())
    }

    /// Fetch an attempt by ID.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn get_attempt(&self, id: AttemptId) -> Result<AttemptRecord, SessionError> {
        AttemptQueries::get_attempt(id, self.attempts.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use exam_core::model::AnswerMap;
    use exam_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn build_record(assessment: &str, correct: u32, completed_offset_secs: i64) -> AttemptRecord {
        let started = fixed_now() + chrono::Duration::seconds(completed_offset_secs - 60);
        let completed = fixed_now() + chrono::Duration::seconds(completed_offset_secs);
        AttemptRecord::from_persisted(
            AssessmentId::new(assessment),
            AnswerMap::new(),
            correct * 4,
            correct,
            0,
            5 - correct,
            5,
            started,
            completed,
        )
        .unwrap()
    }

    #[test]
    fn list_item_is_presentation_agnostic() {
        let record = build_record("vocab-1", 3, 0);
        let item = AttemptListItem::from_record(42, &record);

        assert_eq!(item.id, 42);
        assert_eq!(item.completed_at, record.completed_at());
        assert_eq!(item.score, 12);
        assert_eq!(item.total_questions, 5);
    }

    #[tokio::test]
    async fn list_recent_attempts_filters_by_range() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");
        let assessment = AssessmentId::new("vocab-1");

        let recent = build_record("vocab-1", 4, -86_400);
        let old = build_record("vocab-1", 1, -86_400 * 10);
        repo.append_attempt(&user, &recent).await.unwrap();
        repo.append_attempt(&user, &old).await.unwrap();

        let svc = AttemptHistoryService::new(Clock::Fixed(fixed_now()), Arc::new(repo));
        let items = svc
            .list_recent_attempts(&user, &assessment, 7, 10)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].completed_at, recent.completed_at());
        assert_eq!(items[0].correct, 4);
    }

    #[tokio::test]
    async fn latest_by_assessment_returns_one_item_per_assessment() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");

        repo.append_attempt(&user, &build_record("vocab-1", 1, -7_200))
            .await
            .unwrap();
        let id_latest = repo
            .append_attempt(&user, &build_record("vocab-1", 3, -3_600))
            .await
            .unwrap();
        let id_grammar = repo
            .append_attempt(&user, &build_record("grammar-1", 2, -3_600))
            .await
            .unwrap();

        let svc = AttemptHistoryService::new(Clock::Fixed(fixed_now()), Arc::new(repo));
        let items = svc
            .list_latest_by_assessment(
                &user,
                &[AssessmentId::new("vocab-1"), AssessmentId::new("grammar-1")],
            )
            .await
            .unwrap();

        let mut by_assessment = std::collections::HashMap::new();
        for item in items {
            by_assessment.insert(item.assessment_id.clone(), item.id);
        }

        assert_eq!(
            by_assessment.get(&AssessmentId::new("vocab-1")),
            Some(&id_latest)
        );
        assert_eq!(
            by_assessment.get(&AssessmentId::new("grammar-1")),
            Some(&id_grammar)
        );
    }

    #[tokio::test]
    async fn get_attempt_round_trips() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");
        let record = build_record("vocab-1", 2, 0);
        let id = repo.append_attempt(&user, &record).await.unwrap();

        let svc = AttemptHistoryService::new(Clock::Fixed(fixed_now()), Arc::new(repo));
        let fetched = svc.get_attempt(id).await.unwrap();
        assert_eq!(fetched, record);
    }
}

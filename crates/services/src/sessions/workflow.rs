use std::sync::Arc;

use exam_core::model::{AssessmentId, AttemptRecord, UserId};
use storage::repository::AttemptRepository;

use super::service::{ExamSession, SessionTick};
use crate::Clock;
use crate::catalog::AssessmentCatalog;
use crate::error::SessionError;

/// Result of submitting a session, persisted or not.
///
/// `attempt_id` is `None` when the history write failed; the record (and the
/// score in it) is still valid and shown to the learner. Use
/// [`ExamLoopService::finalize_attempt`] to retry persistence.
#[derive(Debug, Clone)]
pub struct ExamSubmitResult {
    pub record: AttemptRecord,
    pub attempt_id: Option<i64>,
}

/// Orchestrates session start, the countdown, and persisted submission.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    catalog: Arc<AssessmentCatalog>,
    attempts: Arc<dyn AttemptRepository>,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<AssessmentCatalog>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            attempts,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &AssessmentCatalog {
        &self.catalog
    }

    /// Start a new session for the given assessment.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Catalog` when the id is unknown; the caller
    /// should fall back to a listing view, not retry.
    pub fn start(&self, assessment_id: &AssessmentId) -> Result<ExamSession, SessionError> {
        let assessment = self.catalog.get(assessment_id)?;
        let session = ExamSession::new(assessment, self.clock.now())?;
        tracing::debug!(assessment = %assessment_id, "assessment session started");
        Ok(session)
    }

    /// Submit the session and append the attempt to the user's history.
    ///
    /// Persistence is best-effort: a storage failure is logged and reported
    /// through `attempt_id: None`, but never withholds the graded record.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the submission itself fails.
    pub async fn submit(
        &self,
        session: &mut ExamSession,
        user_id: &UserId,
    ) -> Result<ExamSubmitResult, SessionError> {
        let now = self.clock.now();
        let record = session.submit(now)?.clone();
        self.persist_best_effort(session, user_id, &record).await;

        Ok(ExamSubmitResult {
            record,
            attempt_id: session.attempt_id(),
        })
    }

    /// Advance the countdown; on expiry, persist the forced submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the forced submission fails.
    pub async fn tick(
        &self,
        session: &mut ExamSession,
        user_id: &UserId,
    ) -> Result<SessionTick, SessionError> {
        let now = self.clock.now();
        let outcome = session.tick(now)?;

        if outcome == SessionTick::Expired {
            tracing::debug!(
                assessment = %session.assessment().id(),
                "time limit reached, session submitted"
            );
            if let Some(record) = session.record().cloned() {
                self.persist_best_effort(session, user_id, &record).await;
            }
        }

        Ok(outcome)
    }

    /// Retry attempt persistence after a submitted session failed to save.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` if the session has no record yet.
    /// Returns `SessionError::Storage` if persistence fails again.
    pub async fn finalize_attempt(
        &self,
        session: &mut ExamSession,
        user_id: &UserId,
    ) -> Result<i64, SessionError> {
        if let Some(id) = session.attempt_id() {
            return Ok(id);
        }

        let record = session
            .record()
            .cloned()
            .ok_or(SessionError::NotSubmitted)?;
        let id = self.attempts.append_attempt(user_id, &record).await?;
        session.set_attempt_id(id);
        Ok(id)
    }

    async fn persist_best_effort(
        &self,
        session: &mut ExamSession,
        user_id: &UserId,
        record: &AttemptRecord,
    ) {
        if session.attempt_id().is_some() {
            return;
        }
        match self.attempts.append_attempt(user_id, record).await {
            Ok(id) => session.set_attempt_id(id),
            Err(err) => {
                tracing::warn!(
                    assessment = %record.assessment_id(),
                    error = %err,
                    "failed to save attempt history; score remains available"
                );
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

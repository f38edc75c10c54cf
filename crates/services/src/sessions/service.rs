use chrono::{DateTime, Utc};
use std::fmt;

use exam_core::model::{
    AnswerMap, AssessmentDefinition, AttemptRecord, QuestionDefinition, QuestionId,
    ScoreBreakdown,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// Outcome of a single countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTick {
    /// Time is still running; the new remaining value is reported.
    Running { remaining_seconds: u32 },
    /// This tick crossed zero and forced the submission.
    Expired,
    /// The session is already submitted; the countdown no longer moves.
    Stopped,
}

/// In-memory state for one timed pass through an assessment.
///
/// Owned by the caller for the lifetime of the attempt and discarded on
/// abandonment; nothing is persisted until submission. The countdown is
/// cooperative: the host calls [`ExamSession::tick`] once per second, and
/// crossing zero submits through the same guard as an explicit
/// [`ExamSession::submit`], so the two can race harmlessly.
pub struct ExamSession {
    assessment: AssessmentDefinition,
    current: usize,
    answers: AnswerMap,
    remaining_seconds: u32,
    started_at: DateTime<Utc>,
    record: Option<AttemptRecord>,
    attempt_id: Option<i64>,
}

impl ExamSession {
    /// Create a fresh session positioned at the first question.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the assessment has no questions.
    pub fn new(
        assessment: &AssessmentDefinition,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if assessment.question_count() == 0 {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            assessment: assessment.clone(),
            current: 0,
            answers: AnswerMap::new(),
            remaining_seconds: assessment.time_limit_seconds(),
            started_at,
            record: None,
            attempt_id: None,
        })
    }

    #[must_use]
    pub fn assessment(&self) -> &AssessmentDefinition {
        &self.assessment
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionDefinition> {
        self.assessment.question_at(self.current)
    }

    /// The option picked for a question, if any.
    #[must_use]
    pub fn answer_for(&self, id: &QuestionId) -> Option<usize> {
        self.answers.get(id).copied()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.record.is_some()
    }

    /// The attempt record, once submitted.
    #[must_use]
    pub fn record(&self) -> Option<&AttemptRecord> {
        self.record.as_ref()
    }

    /// Storage row id of the persisted attempt, once the workflow saved it.
    #[must_use]
    pub fn attempt_id(&self) -> Option<i64> {
        self.attempt_id
    }

    pub(crate) fn set_attempt_id(&mut self, id: i64) {
        self.attempt_id = Some(id);
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.assessment.question_count();
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            unanswered: total.saturating_sub(answered),
            current: self.current,
            remaining_seconds: self.remaining_seconds,
            is_submitted: self.is_submitted(),
        }
    }

    /// Record or change the answer for a question.
    ///
    /// Does not advance the current question; learners may revisit and
    /// change any answer until submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` after submission,
    /// `SessionError::UnknownQuestion` for an id outside this assessment,
    /// and `SessionError::OptionOutOfRange` for an option index past the
    /// question's options.
    pub fn select_answer(
        &mut self,
        question_id: &QuestionId,
        option_index: usize,
    ) -> Result<(), SessionError> {
        if self.is_submitted() {
            return Err(SessionError::AlreadySubmitted);
        }
        let Some(question) = self.assessment.question(question_id) else {
            return Err(SessionError::UnknownQuestion(question_id.clone()));
        };
        if option_index >= question.option_count() {
            return Err(SessionError::OptionOutOfRange {
                id: question_id.clone(),
                index: option_index,
                len: question.option_count(),
            });
        }

        self.answers.insert(question_id.clone(), option_index);
        Ok(())
    }

    /// Jump to a question by index, clamped to the question range.
    ///
    /// Out-of-range requests are benign UI edge cases and clamp silently
    /// instead of erroring. Navigation stays available after submission so
    /// explanations can be reviewed.
    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(self.assessment.question_count().saturating_sub(1));
    }

    /// Move to the next question; no-op at the last one.
    pub fn next(&mut self) {
        self.go_to(self.current.saturating_add(1));
    }

    /// Move to the previous question; no-op at the first one.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Advance the countdown by one second.
    ///
    /// Crossing zero forces the submission exactly once; the `record` guard
    /// keeps later ticks (and racing explicit submits) from firing again.
    ///
    /// # Errors
    ///
    /// Propagates submission errors from the forced submit on expiry.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<SessionTick, SessionError> {
        if self.is_submitted() {
            return Ok(SessionTick::Stopped);
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.submit(now)?;
            return Ok(SessionTick::Expired);
        }

        Ok(SessionTick::Running {
            remaining_seconds: self.remaining_seconds,
        })
    }

    /// Submit the session, grading the current answers.
    ///
    /// Idempotent: the first call freezes the answers and builds the attempt
    /// record; repeated calls return the same record without recomputation.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Attempt` if the record cannot be built (e.g. a
    /// submission timestamp before the session start).
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<&AttemptRecord, SessionError> {
        if self.record.is_none() {
            let breakdown = ScoreBreakdown::from_answers(&self.assessment, &self.answers);
            let record = AttemptRecord::from_submission(
                &self.assessment,
                self.answers.clone(),
                breakdown,
                self.started_at,
                now,
            )?;
            self.record = Some(record);
        }

        self.record.as_ref().ok_or(SessionError::NotSubmitted)
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("assessment_id", self.assessment.id())
            .field("current", &self.current)
            .field("answered", &self.answers.len())
            .field("remaining_seconds", &self.remaining_seconds)
            .field("started_at", &self.started_at)
            .field("submitted", &self.is_submitted())
            .field("attempt_id", &self.attempt_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

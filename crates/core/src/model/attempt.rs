use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::assessment::AssessmentDefinition;
use crate::model::ids::AssessmentId;
use crate::model::score::{AnswerMap, ScoreBreakdown};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many questions for a single attempt: {len}")]
    TooManyQuestions { len: usize },

    #[error("question count ({total}) does not match bucket counts ({sum})")]
    CountMismatch { total: u32, sum: u32 },
}

/// Immutable snapshot of one finished pass through an assessment.
///
/// Created at submission time and appended to the learner's history; nothing
/// in this workspace mutates or deletes a record after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    assessment_id: AssessmentId,
    answers: AnswerMap,
    score: u32,
    correct: u32,
    wrong: u32,
    empty: u32,
    total_questions: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Rehydrate an attempt record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTimeRange` if `completed_at` is before
    /// `started_at`, or `AttemptError::CountMismatch` if the bucket counts
    /// do not add up to `total_questions`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        assessment_id: AssessmentId,
        answers: AnswerMap,
        score: u32,
        correct: u32,
        wrong: u32,
        empty: u32,
        total_questions: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if completed_at < started_at {
            return Err(AttemptError::InvalidTimeRange);
        }
        let sum = correct.saturating_add(wrong).saturating_add(empty);
        if sum != total_questions {
            return Err(AttemptError::CountMismatch {
                total: total_questions,
                sum,
            });
        }

        Ok(Self {
            assessment_id,
            answers,
            score,
            correct,
            wrong,
            empty,
            total_questions,
            started_at,
            completed_at,
        })
    }

    /// Build a record from a graded answer set at submission time.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTimeRange` if `completed_at` is before
    /// `started_at`, or `AttemptError::TooManyQuestions` if the question
    /// count cannot fit in `u32`.
    pub fn from_submission(
        assessment: &AssessmentDefinition,
        answers: AnswerMap,
        breakdown: ScoreBreakdown,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        let len = assessment.question_count();
        let total_questions =
            u32::try_from(len).map_err(|_| AttemptError::TooManyQuestions { len })?;

        Self::from_persisted(
            assessment.id().clone(),
            answers,
            breakdown.score(),
            breakdown.correct(),
            breakdown.wrong(),
            breakdown.empty(),
            total_questions,
            started_at,
            completed_at,
        )
    }

    #[must_use]
    pub fn assessment_id(&self) -> &AssessmentId {
        &self.assessment_id
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn empty(&self) -> u32 {
        self.empty
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::assessment::QuestionDefinition;
    use crate::model::ids::QuestionId;
    use crate::time::fixed_now;

    fn build_assessment(question_total: usize) -> AssessmentDefinition {
        let questions = (1..=question_total)
            .map(|i| {
                QuestionDefinition::new(
                    QuestionId::new(format!("q{i}")),
                    format!("Prompt {i}"),
                    vec!["a".into(), "b".into()],
                    0,
                    None,
                )
                .unwrap()
            })
            .collect();
        AssessmentDefinition::new(
            AssessmentId::new("a1"),
            "Attempts",
            None,
            300,
            8,
            4,
            questions,
        )
        .unwrap()
    }

    #[test]
    fn submission_snapshot_carries_breakdown() {
        let assessment = build_assessment(3);
        let mut answers = AnswerMap::new();
        answers.insert(QuestionId::new("q1"), 0);
        answers.insert(QuestionId::new("q2"), 1);
        let breakdown = ScoreBreakdown::from_answers(&assessment, &answers);

        let now = fixed_now();
        let record =
            AttemptRecord::from_submission(&assessment, answers, breakdown, now, now).unwrap();

        assert_eq!(record.assessment_id(), &AssessmentId::new("a1"));
        assert_eq!(record.score(), 4);
        assert_eq!(record.correct(), 1);
        assert_eq!(record.wrong(), 1);
        assert_eq!(record.empty(), 1);
        assert_eq!(record.total_questions(), 3);
        assert_eq!(record.answers().len(), 2);
    }

    #[test]
    fn from_persisted_rejects_count_mismatch() {
        let now = fixed_now();
        let err = AttemptRecord::from_persisted(
            AssessmentId::new("a1"),
            AnswerMap::new(),
            8,
            2,
            1,
            1,
            3,
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(err, AttemptError::CountMismatch { total: 3, sum: 4 });
    }

    #[test]
    fn from_persisted_rejects_inverted_time_range() {
        let now = fixed_now();
        let err = AttemptRecord::from_persisted(
            AssessmentId::new("a1"),
            AnswerMap::new(),
            0,
            0,
            0,
            2,
            2,
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, AttemptError::InvalidTimeRange);
    }
}

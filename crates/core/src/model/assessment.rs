use thiserror::Error;

use crate::model::ids::{AssessmentId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment title cannot be empty")]
    EmptyTitle,

    #[error("time limit must be > 0 seconds")]
    InvalidTimeLimit,

    #[error("points per correct answer must be > 0")]
    InvalidPointsPerCorrect,

    #[error("assessment has no questions")]
    NoQuestions,

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("question text cannot be empty")]
    EmptyQuestionText,

    #[error("question needs at least 2 options, got {len}")]
    TooFewOptions { len: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct answer index {index} out of range for {len} options")]
    CorrectAnswerOutOfRange { index: usize, len: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Options keep their catalog order; `correct_answer_index` points into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDefinition {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer_index: usize,
    explanation: Option<String>,
}

impl QuestionDefinition {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyQuestionText` for a blank prompt,
    /// `AssessmentError::TooFewOptions` for fewer than two options,
    /// `AssessmentError::EmptyOption` for a blank option, and
    /// `AssessmentError::CorrectAnswerOutOfRange` when the answer key does
    /// not point at an option.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer_index: usize,
        explanation: Option<String>,
    ) -> Result<Self, AssessmentError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AssessmentError::EmptyQuestionText);
        }
        if options.len() < 2 {
            return Err(AssessmentError::TooFewOptions { len: options.len() });
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(AssessmentError::EmptyOption { index });
        }
        if correct_answer_index >= options.len() {
            return Err(AssessmentError::CorrectAnswerOutOfRange {
                index: correct_answer_index,
                len: options.len(),
            });
        }

        let explanation = explanation
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(Self {
            id,
            text: text.trim().to_owned(),
            options,
            correct_answer_index,
            explanation,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_answer_index(&self) -> usize {
        self.correct_answer_index
    }

    /// Rationale shown after submission, if the catalog provides one.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Whether the given option index is the answer key.
    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_answer_index
    }
}

//
// ─── ASSESSMENT ────────────────────────────────────────────────────────────────
//

/// A named, ordered set of questions with a time limit.
///
/// Covers both "exam" and "quiz" shaped content; question order is
/// significant and preserved for navigation and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentDefinition {
    id: AssessmentId,
    title: String,
    description: Option<String>,
    time_limit_seconds: u32,
    passing_score: u32,
    points_per_correct: u32,
    questions: Vec<QuestionDefinition>,
}

impl AssessmentDefinition {
    /// Creates a validated assessment definition.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyTitle` for a blank title,
    /// `AssessmentError::InvalidTimeLimit` or
    /// `AssessmentError::InvalidPointsPerCorrect` for zero settings,
    /// `AssessmentError::NoQuestions` for an empty question list, and
    /// `AssessmentError::DuplicateQuestionId` when two questions share an id.
    pub fn new(
        id: AssessmentId,
        title: impl Into<String>,
        description: Option<String>,
        time_limit_seconds: u32,
        passing_score: u32,
        points_per_correct: u32,
        questions: Vec<QuestionDefinition>,
    ) -> Result<Self, AssessmentError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AssessmentError::EmptyTitle);
        }
        if time_limit_seconds == 0 {
            return Err(AssessmentError::InvalidTimeLimit);
        }
        if points_per_correct == 0 {
            return Err(AssessmentError::InvalidPointsPerCorrect);
        }
        if questions.is_empty() {
            return Err(AssessmentError::NoQuestions);
        }

        let mut seen = std::collections::HashSet::new();
        for question in &questions {
            if !seen.insert(question.id().clone()) {
                return Err(AssessmentError::DuplicateQuestionId(question.id().clone()));
            }
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description,
            time_limit_seconds,
            passing_score,
            points_per_correct,
            questions,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &AssessmentId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_seconds
    }

    /// Threshold used only for pass/fail labeling, on the score scale.
    #[must_use]
    pub fn passing_score(&self) -> u32 {
        self.passing_score
    }

    #[must_use]
    pub fn points_per_correct(&self) -> u32 {
        self.points_per_correct
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&QuestionDefinition> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn is_passing(&self, score: u32) -> bool {
        score >= self.passing_score
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

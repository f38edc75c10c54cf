//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{AssessmentError, AssessmentId, AttemptError, QuestionId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the assessment catalog loader.
///
/// `NotFound` means the catalog loaded fine but does not contain the
/// requested id; `LoadFailure` means the catalog itself could not be read or
/// parsed. Both are terminal for the caller, which should fall back to a
/// listing view rather than retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("assessment not found: {0}")]
    NotFound(AssessmentId),

    #[error("failed to load assessment catalog: {0}")]
    LoadFailure(String),

    #[error("duplicate assessment id in catalog: {0}")]
    DuplicateAssessment(AssessmentId),

    #[error(transparent)]
    Definition(#[from] AssessmentError),
}

/// Errors emitted by exam sessions and the exam workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("session already submitted")]
    AlreadySubmitted,

    #[error("session not submitted yet")]
    NotSubmitted,

    #[error("unknown question id: {0}")]
    UnknownQuestion(QuestionId),

    #[error("option index {index} out of range for question {id} ({len} options)")]
    OptionOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Attempt(#[from] AttemptError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

use thiserror::Error;

use crate::model::AssessmentError;
use crate::model::AttemptError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

mod assessment;
mod attempt;
mod ids;
mod score;

pub use assessment::{AssessmentDefinition, AssessmentError, QuestionDefinition};
pub use attempt::{AttemptError, AttemptRecord};
pub use ids::{AssessmentId, QuestionId, UserId};
pub use score::{AnswerMap, ScoreBreakdown};

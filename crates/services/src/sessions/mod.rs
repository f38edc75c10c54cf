mod queries;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{ExamSession, SessionTick};
pub use view::{AttemptAssessmentItem, AttemptHistoryService, AttemptId, AttemptListItem};
pub use workflow::{ExamLoopService, ExamSubmitResult};

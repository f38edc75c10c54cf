#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod sessions;

pub use exam_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use catalog::AssessmentCatalog;
pub use error::{AppServicesError, CatalogError, SessionError};

pub use sessions::{
    AttemptAssessmentItem, AttemptHistoryService, AttemptId, AttemptListItem, ExamLoopService,
    ExamSession, ExamSubmitResult, SessionProgress, SessionTick,
};

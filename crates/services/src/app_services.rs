use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog::AssessmentCatalog;
use crate::error::AppServicesError;
use crate::sessions::{AttemptHistoryService, ExamLoopService};

const DB_URL_ENV: &str = "EXAM_DB_URL";
const CATALOG_PATH_ENV: &str = "EXAM_CATALOG_PATH";

const DEFAULT_DB_URL: &str = "sqlite:exam.db?mode=rwc";
const DEFAULT_CATALOG_PATH: &str = "assessments.json";

/// Assembles the catalog and storage-backed services for an app shell.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<AssessmentCatalog>,
    exam_loop: Arc<ExamLoopService>,
    attempt_history: Arc<AttemptHistoryService>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices").finish_non_exhaustive()
    }
}

impl AppServices {
    /// Build services backed by `SQLite` storage and a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog
    /// loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        catalog_path: impl AsRef<Path>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let catalog = Arc::new(AssessmentCatalog::from_path(catalog_path)?);
        Ok(Self::assemble(catalog, storage, clock))
    }

    /// Build services from `EXAM_DB_URL` and `EXAM_CATALOG_PATH`.
    ///
    /// Unset variables fall back to a local database file and catalog path.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog
    /// loading fails.
    pub async fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let db_url =
            std::env::var(DB_URL_ENV).unwrap_or_else(|_| DEFAULT_DB_URL.to_owned());
        let catalog_path =
            std::env::var(CATALOG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_owned());
        Self::new_sqlite(&db_url, catalog_path, clock).await
    }

    /// Build services over in-memory storage, for tests and prototyping.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog JSON is invalid.
    pub fn in_memory(catalog_json: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(AssessmentCatalog::from_json_str(catalog_json)?);
        Ok(Self::assemble(catalog, Storage::in_memory(), clock))
    }

    fn assemble(catalog: Arc<AssessmentCatalog>, storage: Storage, clock: Clock) -> Self {
        let exam_loop = Arc::new(ExamLoopService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.attempts),
        ));
        let attempt_history = Arc::new(AttemptHistoryService::new(
            clock,
            Arc::clone(&storage.attempts),
        ));

        Self {
            catalog,
            exam_loop,
            attempt_history,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<AssessmentCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn exam_loop(&self) -> Arc<ExamLoopService> {
        Arc::clone(&self.exam_loop)
    }

    #[must_use]
    pub fn attempt_history(&self) -> Arc<AttemptHistoryService> {
        Arc::clone(&self.attempt_history)
    }
}

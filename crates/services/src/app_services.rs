use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::api::{ApiConfig, HttpTestApi, TestApi};
use crate::attempt::AttemptService;
use crate::catalog::CatalogService;
use crate::error::AppServicesError;

/// Assembles app-facing services over one API client and one draft store.
#[derive(Clone)]
pub struct AppServices {
    attempts: Arc<AttemptService>,
    catalog: Arc<CatalogService>,
}

impl AppServices {
    /// Build services backed by the HTTP API and `SQLite` drafts.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client or draft store cannot be
    /// initialized.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        api_config: ApiConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let api: Arc<dyn TestApi> = Arc::new(HttpTestApi::new(api_config)?);
        Ok(Self::from_parts(clock, api, storage))
    }

    /// Build services from an existing API client and storage.
    #[must_use]
    pub fn from_parts(clock: Clock, api: Arc<dyn TestApi>, storage: Storage) -> Self {
        let attempts = Arc::new(AttemptService::new(
            clock,
            Arc::clone(&api),
            Arc::clone(&storage.drafts),
        ));
        let catalog = Arc::new(CatalogService::new(api));
        Self { attempts, catalog }
    }

    #[must_use]
    pub fn attempts(&self) -> Arc<AttemptService> {
        Arc::clone(&self.attempts)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }
}

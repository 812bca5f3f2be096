use std::sync::Arc;

use services::{AttemptService, CatalogService};

pub trait UiApp: Send + Sync {
    fn attempts(&self) -> Arc<AttemptService>;
    fn catalog(&self) -> Arc<CatalogService>;
}

#[derive(Clone)]
pub struct AppContext {
    attempts: Arc<AttemptService>,
    catalog: Arc<CatalogService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            attempts: app.attempts(),
            catalog: app.catalog(),
        }
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

// Provided by the composition root in `crates/app`.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

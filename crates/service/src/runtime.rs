//! Runtime wiring
//!
//! Builds the shared pieces once from the loaded configuration so binaries
//! only deal with `AppContext`.

use std::sync::Arc;

use configs::AppConfig;
use tracing::info;

use crate::api::HttpApi;
use crate::auth::AuthService;
use crate::categories::CategoryCatalog;
use crate::expenses::ExpenseListController;
use crate::onboarding::OnboardingWizard;
use crate::session::SessionStore;
use crate::storage::{FileLocalStore, LocalStore};

pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn LocalStore>,
    pub api: Arc<HttpApi>,
    pub sessions: SessionStore,
}

impl AppContext {
    /// Create the data directory, open the local store and the HTTP client.
    pub async fn bootstrap(config: AppConfig) -> anyhow::Result<Self> {
        common::env::ensure_data_dir(std::path::Path::new(&config.storage.data_dir)).await?;
        let store: Arc<dyn LocalStore> = FileLocalStore::open(config.storage.path()).await?;
        let api = Arc::new(HttpApi::from_config(&config.api)?);
        info!(
            event = "runtime_ready",
            api = %api.base_url(),
            storage = %config.storage.path().display(),
        );
        Ok(Self { sessions: SessionStore::new(store.clone()), config, store, api })
    }

    pub fn auth(&self) -> AuthService<HttpApi> {
        AuthService::new(self.api.clone(), self.sessions.clone())
    }

    /// Expense list using the category options built from the local catalog.
    pub async fn expenses(&self) -> ExpenseListController<HttpApi> {
        let resolver = self.catalog().await.resolver().await;
        ExpenseListController::new(self.api.clone(), self.sessions.clone(), resolver)
    }

    pub async fn catalog(&self) -> CategoryCatalog {
        CategoryCatalog::load(self.store.clone()).await
    }

    pub async fn onboarding(&self) -> anyhow::Result<OnboardingWizard> {
        Ok(OnboardingWizard::hydrate(self.store.clone()).await?)
    }
}

use crate::account::{AccountService, CredentialHasher};
use crate::config::AppConfig;
use crate::controller::{AuthController, ProfileController};
use crate::session::SessionContext;
use crate::store::{RecordStore, SqliteRecordStore};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Everything one running app instance needs: the store-backed service,
/// the session, and the controllers sharing them.
pub struct ProfileApp {
    config: AppConfig,
    service: AccountService,
    session: SessionContext,
    auth: AuthController,
    profile: ProfileController,
}

impl ProfileApp {
    /// Open the SQLite store named by `config` and wire the controllers.
    pub fn open(config: AppConfig) -> Result<Self> {
        let store = SqliteRecordStore::from_config(&config.store).with_context(|| {
            format!(
                "Failed to initialize account store at {}",
                config.store.db_path().display()
            )
        })?;
        tracing::info!(
            db = %config.store.db_path().display(),
            credential_mode = config.credentials.mode.as_str(),
            "Account store initialized"
        );
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Wire the app around an already-open store.
    pub fn with_store(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        let hasher = CredentialHasher::new(
            config.credentials.mode,
            config.credentials.hash_iterations,
        );
        let service = AccountService::new(store, hasher);
        let session = SessionContext::new();

        Self {
            auth: AuthController::new(service.clone(), session.clone()),
            profile: ProfileController::new(service.clone()),
            config,
            service,
            session,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn service(&self) -> &AccountService {
        &self.service
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn auth(&self) -> &AuthController {
        &self.auth
    }

    pub fn profile(&self) -> &ProfileController {
        &self.profile
    }
}

use crate::account::{Account, AccountResult, AccountService};
use crate::outcome::{OperationState, OutcomeCell};
use crate::session::SessionContext;
use tokio::sync::watch;

/// Drives the login and registration screens.
pub struct AuthController {
    service: AccountService,
    session: SessionContext,
    login_state: OutcomeCell<Account>,
    register_state: OutcomeCell<()>,
}

impl AuthController {
    pub fn new(service: AccountService, session: SessionContext) -> Self {
        Self {
            service,
            session,
            login_state: OutcomeCell::new(),
            register_state: OutcomeCell::new(),
        }
    }

    /// Authenticate and, on success, make `identifier` the current session.
    /// The published login state never carries the stored credential.
    pub async fn login(&self, identifier: &str, credential_secret: &str) -> AccountResult<Account> {
        self.login_state.set_loading();
        let result = self.service.authenticate(identifier, credential_secret).await;
        if let Ok(ref account) = result {
            self.session.set_current(account.identifier.clone());
        }
        let published = result
            .as_ref()
            .map(Account::without_secret)
            .map_err(|e| e.clone());
        self.login_state.finish(&published);
        result
    }

    pub async fn register(&self, account: Account) -> AccountResult<()> {
        self.register_state.set_loading();
        let result = self.service.register(account).await;
        self.register_state.finish(&result);
        result
    }

    /// Forget the current account and return both screens to `Idle`.
    pub fn logout(&self) {
        self.session.clear();
        self.login_state.reset();
        self.register_state.reset();
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn login_state(&self) -> watch::Receiver<OperationState<Account>> {
        self.login_state.subscribe()
    }

    pub fn register_state(&self) -> watch::Receiver<OperationState<()>> {
        self.register_state.subscribe()
    }

    pub fn latest_login_state(&self) -> OperationState<Account> {
        self.login_state.latest()
    }

    pub fn latest_register_state(&self) -> OperationState<()> {
        self.register_state.latest()
    }

    pub fn reset_login_state(&self) {
        self.login_state.reset();
    }

    pub fn reset_register_state(&self) {
        self.register_state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountError, CredentialHasher, CredentialMode};
    use crate::store::{RecordStore, SqliteRecordStore, StoreResult};
    use parking_lot::Mutex;
    use std::sync::mpsc;
    use std::sync::Arc;

    /// Holds every `get` until the test sends on the paired channel.
    struct GatedStore {
        inner: SqliteRecordStore,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl RecordStore for GatedStore {
        fn insert(&self, record: &Account) -> StoreResult<()> {
            self.inner.insert(record)
        }

        fn get(&self, identifier: &str) -> StoreResult<Option<Account>> {
            let _ = self.gate.lock().recv();
            self.inner.get(identifier)
        }

        fn find_by_credentials(
            &self,
            identifier: &str,
            credential_secret: &str,
        ) -> StoreResult<Option<Account>> {
            self.inner.find_by_credentials(identifier, credential_secret)
        }

        fn update_profile(&self, record: &Account) -> StoreResult<bool> {
            self.inner.update_profile(record)
        }

        fn count(&self) -> StoreResult<u64> {
            self.inner.count()
        }
    }

    fn controller() -> AuthController {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        let service = AccountService::new(
            Arc::new(store),
            CredentialHasher::new(CredentialMode::SaltedHash, 8),
        );
        AuthController::new(service, SessionContext::new())
    }

    fn sample() -> Account {
        Account::new("a@x.com", "A", "p1", "111", "Street 1")
    }

    #[tokio::test]
    async fn register_publishes_success_then_resets() {
        let auth = controller();
        assert_eq!(auth.latest_register_state(), OperationState::Idle);

        auth.register(sample()).await.unwrap();
        assert_eq!(auth.latest_register_state(), OperationState::Success(()));

        auth.reset_register_state();
        assert_eq!(auth.latest_register_state(), OperationState::Idle);
    }

    #[tokio::test]
    async fn duplicate_register_publishes_error_message() {
        let auth = controller();
        auth.register(sample()).await.unwrap();

        let err = auth.register(sample()).await.unwrap_err();
        assert_eq!(err, AccountError::DuplicateIdentifier("a@x.com".into()));
        assert_eq!(
            auth.latest_register_state().error_message(),
            Some("Email a@x.com is already registered")
        );
    }

    #[tokio::test]
    async fn login_sets_session_and_logout_clears_it() {
        let auth = controller();
        auth.register(sample()).await.unwrap();

        let account = auth.login("a@x.com", "p1").await.unwrap();
        assert_eq!(account.identifier, "a@x.com");
        assert_eq!(auth.session().current().as_deref(), Some("a@x.com"));
        assert!(auth.latest_login_state().is_terminal());

        auth.logout();
        assert_eq!(auth.session().current(), None);
        assert_eq!(auth.latest_login_state(), OperationState::Idle);
    }

    #[tokio::test]
    async fn failed_login_leaves_session_empty() {
        let auth = controller();
        auth.register(sample()).await.unwrap();

        assert_eq!(
            auth.login("a@x.com", "nope").await.unwrap_err(),
            AccountError::InvalidCredentials
        );
        assert_eq!(
            auth.latest_login_state().error_message(),
            Some("Invalid email or password")
        );
        assert!(!auth.session().is_authenticated());
    }

    #[tokio::test]
    async fn login_state_receiver_observes_terminal_state() {
        let auth = controller();
        auth.register(sample()).await.unwrap();
        let mut rx = auth.login_state();

        auth.login("a@x.com", "p1").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_terminal());
    }

    #[tokio::test]
    async fn login_state_steps_through_loading_to_success() {
        let inner = SqliteRecordStore::open_in_memory().unwrap();
        inner.insert(&sample()).unwrap();
        let (release, gate) = mpsc::channel();
        let store = GatedStore {
            inner,
            gate: Mutex::new(gate),
        };
        let service = AccountService::new(
            Arc::new(store),
            CredentialHasher::new(CredentialMode::Plain, 1),
        );
        let auth = AuthController::new(service, SessionContext::new());
        let mut rx = auth.login_state();
        assert_eq!(*rx.borrow(), OperationState::Idle);

        let record = async {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                if state.is_loading() {
                    release.send(()).unwrap();
                }
                let done = state.is_terminal();
                seen.push(state);
                if done {
                    break;
                }
            }
            seen
        };
        let (result, seen) = tokio::join!(auth.login("a@x.com", "p1"), record);

        result.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_loading());
        assert!(matches!(seen[1], OperationState::Success(_)));
    }

    #[tokio::test]
    async fn published_login_state_drops_sealed_secret() {
        let auth = controller();
        auth.register(sample()).await.unwrap();

        let account = auth.login("a@x.com", "p1").await.unwrap();
        assert!(account.credential_secret.starts_with("sha256$"));

        let published = auth.latest_login_state().value().cloned().unwrap();
        assert_eq!(published.credential_secret, "");
        assert_eq!(published, account.without_secret());
    }
}

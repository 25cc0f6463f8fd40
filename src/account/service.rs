use super::{Account, AccountError, AccountResult, CredentialHasher, CredentialMode};
use crate::store::RecordStore;
use std::sync::Arc;

/// Sole mediator between callers and the record store.
///
/// Each operation runs on Tokio's blocking pool and yields exactly one
/// terminal result. Concurrent identical requests are not de-duplicated.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn RecordStore>,
    hasher: CredentialHasher,
}

impl AccountService {
    pub fn new(store: Arc<dyn RecordStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    pub fn credential_mode(&self) -> CredentialMode {
        self.hasher.mode()
    }

    /// Register a new account. Fails with `DuplicateIdentifier` when the
    /// email is taken.
    pub async fn register(&self, account: Account) -> AccountResult<()> {
        self.run("register", move |store, hasher| {
            account.validate_registration()?;

            if store.get(&account.identifier)?.is_some() {
                tracing::warn!(identifier = %account.identifier, "Registration rejected: email taken");
                return Err(AccountError::DuplicateIdentifier(account.identifier));
            }

            let sealed = Account {
                credential_secret: hasher.seal(&account.credential_secret),
                ..account
            };
            // The primary key catches a registration that raced past the check above.
            store.insert(&sealed)?;
            tracing::info!(identifier = %sealed.identifier, "Account registered");
            Ok(())
        })
        .await
    }

    /// Match an identifier + secret pair exactly (case-sensitive).
    pub async fn authenticate(
        &self,
        identifier: &str,
        credential_secret: &str,
    ) -> AccountResult<Account> {
        let identifier = identifier.to_string();
        let secret = credential_secret.to_string();
        self.run("authenticate", move |store, hasher| {
            // Sealed and plain rows both go through `verify`, whatever the mode.
            let matched = match store.get(&identifier)? {
                Some(account) if hasher.verify(&secret, &account.credential_secret) => {
                    Some(account)
                }
                Some(_) => None,
                None => {
                    hasher.verify_dummy(&secret);
                    None
                }
            };

            match matched {
                Some(account) => {
                    tracing::info!(identifier = %identifier, "Login succeeded");
                    Ok(account)
                }
                None => {
                    tracing::warn!(identifier = %identifier, "Login rejected");
                    Err(AccountError::InvalidCredentials)
                }
            }
        })
        .await
    }

    /// Load an account by email.
    pub async fn fetch_by_identifier(&self, identifier: &str) -> AccountResult<Account> {
        let identifier = identifier.to_string();
        self.run("fetch_by_identifier", move |store, _| {
            tracing::debug!(identifier = %identifier, "Fetching account");
            store
                .get(&identifier)?
                .ok_or(AccountError::NotFound(identifier))
        })
        .await
    }

    /// Overwrite name, phone and address. Identifier and credential are
    /// carried through untouched; a missing row fails with `NotFound`.
    pub async fn update_profile(&self, account: Account) -> AccountResult<()> {
        self.run("update_profile", move |store, _| {
            account.validate_profile()?;

            if !store.update_profile(&account)? {
                tracing::warn!(identifier = %account.identifier, "Update rejected: no such account");
                return Err(AccountError::NotFound(account.identifier));
            }
            tracing::info!(identifier = %account.identifier, "Profile updated");
            Ok(())
        })
        .await
    }

    /// Number of registered accounts.
    pub async fn account_count(&self) -> AccountResult<u64> {
        self.run("account_count", |store, _| Ok(store.count()?)).await
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> AccountResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStore, &CredentialHasher) -> AccountResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let hasher = self.hasher;

        let result = tokio::task::spawn_blocking(move || f(store.as_ref(), &hasher))
            .await
            .map_err(|e| AccountError::TaskFailed(format!("{op}: {e}")))?;

        if let Err(AccountError::StorageFailure(ref message)) = result {
            tracing::error!(op, error = %message, "Account store failure");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRecordStore;

    fn service(mode: CredentialMode) -> AccountService {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        AccountService::new(Arc::new(store), CredentialHasher::new(mode, 8))
    }

    fn sample() -> Account {
        Account::new("a@x.com", "A", "p1", "111", "Street 1")
    }

    #[tokio::test]
    async fn register_then_duplicate_fails_and_keeps_first() {
        let svc = service(CredentialMode::Plain);

        svc.register(sample()).await.unwrap();
        let mut second = sample();
        second.display_name = "Impostor".into();
        second.credential_secret = "other".into();

        let err = svc.register(second).await.unwrap_err();
        assert_eq!(err, AccountError::DuplicateIdentifier("a@x.com".into()));
        assert_eq!(svc.fetch_by_identifier("a@x.com").await.unwrap(), sample());
        assert_eq!(svc.account_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn plain_authenticate_returns_registered_account() {
        let svc = service(CredentialMode::Plain);
        svc.register(sample()).await.unwrap();

        assert_eq!(svc.authenticate("a@x.com", "p1").await.unwrap(), sample());
        assert_eq!(
            svc.authenticate("a@x.com", "wrong").await.unwrap_err(),
            AccountError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn hashed_authenticate_matches_all_but_secret() {
        let svc = service(CredentialMode::SaltedHash);
        svc.register(sample()).await.unwrap();

        let account = svc.authenticate("a@x.com", "p1").await.unwrap();
        assert_ne!(account.credential_secret, "p1");
        assert_eq!(
            Account {
                credential_secret: "p1".into(),
                ..account
            },
            sample()
        );
        assert_eq!(
            svc.authenticate("a@x.com", "P1").await.unwrap_err(),
            AccountError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn authenticate_unknown_identifier_is_invalid_credentials() {
        for mode in [CredentialMode::Plain, CredentialMode::SaltedHash] {
            let svc = service(mode);
            assert_eq!(
                svc.authenticate("ghost@x.com", "p1").await.unwrap_err(),
                AccountError::InvalidCredentials
            );
        }
    }

    #[tokio::test]
    async fn plain_mode_verifies_rows_sealed_under_hashing() {
        let store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
        let hashed = AccountService::new(
            Arc::clone(&store),
            CredentialHasher::new(CredentialMode::SaltedHash, 8),
        );
        hashed.register(sample()).await.unwrap();
        let sealed = store.get("a@x.com").unwrap().unwrap().credential_secret;
        assert!(sealed.starts_with("sha256$"));

        let plain = AccountService::new(store, CredentialHasher::new(CredentialMode::Plain, 8));
        assert!(plain.authenticate("a@x.com", "p1").await.is_ok());
        assert_eq!(
            plain.authenticate("a@x.com", &sealed).await.unwrap_err(),
            AccountError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn authenticate_is_case_sensitive_on_identifier() {
        let svc = service(CredentialMode::Plain);
        svc.register(sample()).await.unwrap();

        assert!(svc.authenticate("A@x.com", "p1").await.is_err());
    }

    #[tokio::test]
    async fn fetch_unknown_identifier_is_not_found() {
        let svc = service(CredentialMode::Plain);
        assert_eq!(
            svc.fetch_by_identifier("ghost@x.com").await.unwrap_err(),
            AccountError::NotFound("ghost@x.com".into())
        );
    }

    #[tokio::test]
    async fn update_keeps_identifier_and_secret() {
        let svc = service(CredentialMode::Plain);
        svc.register(sample()).await.unwrap();

        let mut edited = Account::new("a@x.com", "A2", "attempted-change", "222", "Street 2");
        svc.update_profile(edited.clone()).await.unwrap();

        edited.credential_secret = "p1".into();
        assert_eq!(svc.fetch_by_identifier("a@x.com").await.unwrap(), edited);
        assert!(svc.authenticate("a@x.com", "p1").await.is_ok());
        assert!(svc.authenticate("a@x.com", "attempted-change").await.is_err());
    }

    #[tokio::test]
    async fn update_missing_account_is_not_found() {
        let svc = service(CredentialMode::Plain);
        assert_eq!(
            svc.update_profile(sample()).await.unwrap_err(),
            AccountError::NotFound("a@x.com".into())
        );
        assert_eq!(svc.account_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_storage() {
        let svc = service(CredentialMode::Plain);

        let mut account = sample();
        account.identifier = " ".into();
        assert_eq!(
            svc.register(account).await.unwrap_err(),
            AccountError::MissingField("email")
        );

        svc.register(sample()).await.unwrap();
        let mut edited = sample();
        edited.phone.clear();
        assert_eq!(
            svc.update_profile(edited).await.unwrap_err(),
            AccountError::MissingField("phone number")
        );
    }
}

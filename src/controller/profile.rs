use crate::account::{Account, AccountResult, AccountService};
use crate::outcome::{OperationState, OutcomeCell};
use tokio::sync::watch;

/// Drives the profile view and the edit-profile screen.
pub struct ProfileController {
    service: AccountService,
    profile_state: OutcomeCell<Account>,
    update_state: OutcomeCell<()>,
}

impl ProfileController {
    pub fn new(service: AccountService) -> Self {
        Self {
            service,
            profile_state: OutcomeCell::new(),
            update_state: OutcomeCell::new(),
        }
    }

    pub async fn load_profile(&self, identifier: &str) -> AccountResult<Account> {
        self.profile_state.set_loading();
        let result = self.service.fetch_by_identifier(identifier).await;
        self.profile_state.finish(&result);
        result
    }

    /// Write the edited profile. A successful write is followed by a reload
    /// of `profile_state`; the reload never changes the returned result.
    pub async fn update_profile(&self, account: Account) -> AccountResult<()> {
        self.update_state.set_loading();
        let identifier = account.identifier.clone();
        let result = self.service.update_profile(account).await;
        self.update_state.finish(&result);

        if result.is_ok() {
            if let Err(e) = self.load_profile(&identifier).await {
                tracing::warn!(identifier = %identifier, error = %e, "Profile refresh after update failed");
            }
        }
        result
    }

    pub fn profile_state(&self) -> watch::Receiver<OperationState<Account>> {
        self.profile_state.subscribe()
    }

    pub fn update_state(&self) -> watch::Receiver<OperationState<()>> {
        self.update_state.subscribe()
    }

    pub fn latest_profile_state(&self) -> OperationState<Account> {
        self.profile_state.latest()
    }

    pub fn latest_update_state(&self) -> OperationState<()> {
        self.update_state.latest()
    }

    pub fn reset_update_state(&self) {
        self.update_state.reset();
    }
}

//! Student account records and the service that guards them.
//!
//! Provides:
//! - The `Account` entity (email-keyed, one row per student)
//! - Credential sealing/verification (iterated SHA-256 + per-account salt)
//! - `AccountService`: register, authenticate, fetch and profile update,
//!   each run on the blocking pool and reported as `AccountResult`
//!
//! ## Invariants
//! - `identifier` is unique and never rewritten after registration.
//! - Profile updates touch `display_name`, `phone` and `address` only.

pub mod credentials;
pub mod error;
pub mod service;

pub use credentials::{CredentialHasher, CredentialMode};
pub use error::{AccountError, AccountResult};
pub use service::AccountService;

use serde::{Deserialize, Serialize};

/// A registered student account.
///
/// Field aliases accept the mobile client's JSON names (`email`, `name`,
/// `password`, `phoneNumber`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Email address; the primary key.
    #[serde(alias = "email")]
    pub identifier: String,
    #[serde(alias = "name")]
    pub display_name: String,
    /// Plain secret on input. Rows read back from the store carry the
    /// at-rest form chosen by the configured [`CredentialMode`].
    #[serde(alias = "password")]
    pub credential_secret: String,
    #[serde(alias = "phoneNumber")]
    pub phone: String,
    pub address: String,
}

impl Account {
    pub fn new(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        credential_secret: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            credential_secret: credential_secret.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Copy of this account with the editable profile fields replaced.
    pub fn with_profile(&self, update: &ProfileUpdate) -> Self {
        Self {
            display_name: update.display_name.clone(),
            phone: update.phone.clone(),
            address: update.address.clone(),
            ..self.clone()
        }
    }

    /// Copy with `credential_secret` cleared, for state that outlives the call.
    pub fn without_secret(&self) -> Self {
        Self {
            credential_secret: String::new(),
            ..self.clone()
        }
    }

    /// Every field must be non-blank before registration.
    pub fn validate_registration(&self) -> AccountResult<()> {
        require("name", &self.display_name)?;
        require("email", &self.identifier)?;
        require("password", &self.credential_secret)?;
        require("phone number", &self.phone)?;
        require("address", &self.address)
    }

    /// Editable fields must be non-blank before an update.
    pub fn validate_profile(&self) -> AccountResult<()> {
        require("email", &self.identifier)?;
        require("name", &self.display_name)?;
        require("phone number", &self.phone)?;
        require("address", &self.address)
    }
}

/// The editable subset of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "phoneNumber")]
    pub phone: String,
    pub address: String,
}

impl ProfileUpdate {
    pub fn new(
        display_name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }
}

fn require(field: &'static str, value: &str) -> AccountResult<()> {
    if value.trim().is_empty() {
        return Err(AccountError::MissingField(field));
    }
    Ok(())
}

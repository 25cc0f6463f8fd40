#![forbid(unsafe_code)]

//! Student Profile Android Bridge
//!
//! UniFFI bindings that let the Kotlin UI drive the profile core:
//! - Registration, login and logout
//! - Loading and editing the logged-in student's profile
//! - Polling the per-screen outcome state (idle/loading/success/error)
//!
//! Calls block the caller until the storage work finishes; Kotlin invokes
//! them from `Dispatchers.IO`.

use std::sync::{Arc, OnceLock};
use student_profile::{
    logging, Account, AccountError, AppConfig, OperationState, ProfileApp, ProfileUpdate,
};
use tokio::runtime::Runtime;

uniffi::setup_scaffolding!();

/// Global runtime for async operations
static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to create Tokio runtime")
    })
}

/// Profile fields shown to the student. The credential never crosses the FFI.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct StudentProfile {
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub address: String,
}

impl From<Account> for StudentProfile {
    fn from(account: Account) -> Self {
        Self {
            email: account.identifier,
            name: account.display_name,
            phone_number: account.phone,
            address: account.address,
        }
    }
}

/// Input from the registration form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

impl From<RegistrationForm> for Account {
    fn from(form: RegistrationForm) -> Self {
        Account::new(
            form.email,
            form.name,
            form.password,
            form.phone_number,
            form.address,
        )
    }
}

/// Screen state exposed to Kotlin
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum OutcomeState {
    Idle,
    Loading,
    Success { profile: Option<StudentProfile> },
    Error { message: String },
}

impl From<OperationState<Account>> for OutcomeState {
    fn from(state: OperationState<Account>) -> Self {
        match state {
            OperationState::Idle => Self::Idle,
            OperationState::Loading => Self::Loading,
            OperationState::Success(account) => Self::Success {
                profile: Some(account.into()),
            },
            OperationState::Error(message) => Self::Error { message },
        }
    }
}

impl From<OperationState<()>> for OutcomeState {
    fn from(state: OperationState<()>) -> Self {
        match state {
            OperationState::Idle => Self::Idle,
            OperationState::Loading => Self::Loading,
            OperationState::Success(()) => Self::Success { profile: None },
            OperationState::Error(message) => Self::Error { message },
        }
    }
}

/// Main controller exposed to Android
#[derive(uniffi::Object)]
pub struct StudentProfileBridge {
    app: ProfileApp,
}

#[uniffi::export]
impl StudentProfileBridge {
    /// Open the account database under the app's files directory.
    #[uniffi::constructor]
    pub fn new(data_dir: String) -> Result<Arc<Self>, BridgeError> {
        Self::with_config(AppConfig::for_data_dir(data_dir))
    }

    /// Open with a `config.toml`; missing keys take their defaults and the
    /// database stays under `data_dir`.
    #[uniffi::constructor]
    pub fn with_config_file(data_dir: String, config_path: String) -> Result<Arc<Self>, BridgeError> {
        let mut config = AppConfig::load_or_default(std::path::Path::new(&config_path))
            .map_err(|e| BridgeError::ConfigError {
                message: format!("{e:#}"),
            })?;
        config.store.data_dir = data_dir.into();
        Self::with_config(config)
    }

    pub fn register(&self, form: RegistrationForm) -> Result<(), BridgeError> {
        runtime().block_on(self.app.auth().register(form.into()))?;
        Ok(())
    }

    /// Authenticate and make this student the current session.
    pub fn login(&self, email: String, password: String) -> Result<StudentProfile, BridgeError> {
        let account = runtime().block_on(self.app.auth().login(&email, &password))?;
        Ok(account.into())
    }

    pub fn logout(&self) {
        self.app.auth().logout();
        tracing::info!("Student logged out");
    }

    /// Email of the logged-in student, if any.
    pub fn current_email(&self) -> Option<String> {
        self.app.session().current()
    }

    /// Load the logged-in student's profile.
    pub fn load_profile(&self) -> Result<StudentProfile, BridgeError> {
        let email = self.require_session()?;
        let account = runtime().block_on(self.app.profile().load_profile(&email))?;
        Ok(account.into())
    }

    /// Replace name, phone and address of the logged-in student. Email and
    /// password are never changed here.
    pub fn update_profile(
        &self,
        name: String,
        phone_number: String,
        address: String,
    ) -> Result<StudentProfile, BridgeError> {
        let email = self.require_session()?;
        let current = runtime().block_on(self.app.service().fetch_by_identifier(&email))?;
        let edited = current.with_profile(&ProfileUpdate::new(name, phone_number, address));

        runtime().block_on(self.app.profile().update_profile(edited.clone()))?;
        Ok(edited.into())
    }

    pub fn login_state(&self) -> OutcomeState {
        self.app.auth().latest_login_state().into()
    }

    pub fn register_state(&self) -> OutcomeState {
        self.app.auth().latest_register_state().into()
    }

    pub fn profile_state(&self) -> OutcomeState {
        self.app.profile().latest_profile_state().into()
    }

    pub fn update_state(&self) -> OutcomeState {
        self.app.profile().latest_update_state().into()
    }

    pub fn reset_login_state(&self) {
        self.app.auth().reset_login_state();
    }

    pub fn reset_register_state(&self) {
        self.app.auth().reset_register_state();
    }

    pub fn reset_update_state(&self) {
        self.app.profile().reset_update_state();
    }
}

impl StudentProfileBridge {
    fn with_config(config: AppConfig) -> Result<Arc<Self>, BridgeError> {
        logging::init(&config.logging);
        let app = ProfileApp::open(config).map_err(|e| BridgeError::StorageError {
            message: format!("{e:#}"),
        })?;
        Ok(Arc::new(Self { app }))
    }

    fn require_session(&self) -> Result<String, BridgeError> {
        self.app.session().current().ok_or(BridgeError::NotLoggedIn)
    }
}

/// Errors that can occur in the bridge
#[derive(Debug, Clone, PartialEq, uniffi::Error)]
pub enum BridgeError {
    DuplicateEmail { message: String },
    InvalidCredentials { message: String },
    NotFound { message: String },
    InvalidInput { message: String },
    StorageError { message: String },
    ConfigError { message: String },
    NotLoggedIn,
}

impl From<AccountError> for BridgeError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::DuplicateIdentifier(_) => Self::DuplicateEmail { message },
            AccountError::InvalidCredentials => Self::InvalidCredentials { message },
            AccountError::NotFound(_) => Self::NotFound { message },
            AccountError::MissingField(_) => Self::InvalidInput { message },
            AccountError::StorageFailure(_) | AccountError::TaskFailed(_) => {
                Self::StorageError { message }
            }
        }
    }
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail { message }
            | Self::InvalidCredentials { message }
            | Self::NotFound { message }
            | Self::InvalidInput { message } => write!(f, "{message}"),
            Self::StorageError { message } => write!(f, "Storage error: {message}"),
            Self::ConfigError { message } => write!(f, "Config error: {message}"),
            Self::NotLoggedIn => write!(f, "No student is logged in"),
        }
    }
}

impl std::error::Error for BridgeError {}

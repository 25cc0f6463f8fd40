//! Student profile manager core.
//!
//! Account registration, login, profile viewing and profile editing over an
//! on-device SQLite store. Storage calls run on Tokio's blocking pool and
//! report back through [`outcome::OperationState`] cells that a UI layer
//! observes; the logged-in account lives in an injectable
//! [`session::SessionContext`].

pub mod account;
pub mod app;
pub mod config;
pub mod controller;
pub mod logging;
pub mod outcome;
pub mod session;
pub mod store;

pub use account::{Account, AccountError, AccountResult, AccountService, ProfileUpdate};
pub use app::ProfileApp;
pub use config::AppConfig;
pub use outcome::OperationState;
pub use session::SessionContext;

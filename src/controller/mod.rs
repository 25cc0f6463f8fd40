//! Presentation-facing drivers.
//!
//! A controller owns one [`OutcomeCell`](crate::outcome::OutcomeCell) per
//! operation, moves it `Loading` → terminal around each service call, and
//! keeps the [`SessionContext`](crate::session::SessionContext) in step with
//! login and logout. The UI subscribes to the cells and disables the
//! triggering control while a state is `Loading`.

pub mod auth;
pub mod profile;

pub use auth::AuthController;
pub use profile::ProfileController;

//! Auth module: login, registration and the session guard.
//!
//! Credentials are checked by the backend; this layer validates the forms,
//! maps failures to readable messages and keeps the session in local storage.

pub mod domain;
pub mod service;

pub use domain::{AuthMode, AuthOutcome};
pub use service::AuthService;

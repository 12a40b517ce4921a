//! Client-side behaviour of the Spendario personal-finance app.
//! - Talks to the REST backend through the `api` traits.
//! - Keeps session, categories and onboarding progress in a local key-value store.
//! - Owns form validation and the expense list state machine.

pub mod api;
pub mod auth;
pub mod categories;
pub mod errors;
pub mod expenses;
pub mod onboarding;
pub mod pagination;
pub mod runtime;
pub mod session;
pub mod shell;
pub mod storage;
pub mod validation;

pub use errors::ServiceError;

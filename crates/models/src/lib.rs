//! Wire and state types shared by the Spendario client crates.
//!
//! Everything here is plain data: serde shapes for the REST API and for the
//! blobs kept in local storage. Behaviour lives in the `service` crate.

pub mod errors;
pub mod session;
pub mod expense;
pub mod category;
pub mod onboarding;

pub use errors::ModelError;

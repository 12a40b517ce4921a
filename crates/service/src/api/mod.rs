//! REST API seams.
//!
//! The controllers talk to the backend through these traits; `http` is the
//! reqwest implementation, `mock` an in-memory one for tests and demos.

use async_trait::async_trait;
use models::expense::{Expense, ExpenseInput, ExpensePage};
use models::session::{LoginRequest, RegisterRequest, TokenResponse};

use crate::errors::ServiceError;

pub mod messages;
pub mod http;
pub mod mock;

pub use http::HttpApi;

/// `/auth/*` endpoints. Unauthenticated.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ServiceError>;
    async fn register(&self, req: &RegisterRequest) -> Result<TokenResponse, ServiceError>;
}

/// `/expenses` endpoints. Every call carries the bearer token.
#[async_trait]
pub trait ExpenseApi: Send + Sync {
    async fn list(&self, token: &str, page: u32, page_size: u32) -> Result<ExpensePage, ServiceError>;
    async fn create(&self, token: &str, input: &ExpenseInput) -> Result<Expense, ServiceError>;
    async fn update(&self, token: &str, id: &str, input: &ExpenseInput) -> Result<Expense, ServiceError>;
    async fn delete(&self, token: &str, id: &str) -> Result<(), ServiceError>;
}

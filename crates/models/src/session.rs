use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// User record as returned by the auth endpoints and kept under `spendario.user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Name to greet the user with: the full name when present, else the email.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Persisted bearer token plus the identity it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/register` body; `full_name` is sent as `null` when blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Successful auth response. Fields are optional so an incomplete body can be
/// reported instead of failing to decode.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl TokenResponse {
    pub fn into_session(self) -> Result<Session, ModelError> {
        let token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ModelError::IncompleteAuth("access_token"))?;
        let user = self.user.ok_or(ModelError::IncompleteAuth("user"))?;
        Ok(Session { token, user })
    }
}

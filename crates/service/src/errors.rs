use thiserror::Error;

use models::errors::ModelError;

use crate::validation::FieldErrors;

pub const INCOMPLETE_AUTH: &str = "Resposta de auth incompleta. Tente novamente.";
pub const FIX_HIGHLIGHTED: &str = "Corrija os campos destacados.";
pub const CONNECTION_FAILED: &str = "Não foi possível falar com o servidor. Tente novamente.";
pub const LOCAL_STORAGE_FAILED: &str = "Não foi possível gravar os dados locais.";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Field-level problems found before any request was made.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// Missing or rejected session token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Non-success response, already mapped to a readable message.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Network failure or a body that could not be decoded.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Build the error for a non-success status: 401 is an authorization
    /// problem, everything else an API error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 401 {
            Self::Unauthorized(message)
        } else {
            Self::Api { status, message }
        }
    }

    /// Message to show the user; `fallback` covers errors that carry no
    /// user-facing text of their own.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            ServiceError::Validation(errors) => errors
                .first_message()
                .map(str::to_string)
                .unwrap_or_else(|| FIX_HIGHLIGHTED.to_string()),
            ServiceError::Unauthorized(message) | ServiceError::Api { message, .. } => message.clone(),
            ServiceError::Model(ModelError::IncompleteAuth(_)) => INCOMPLETE_AUTH.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Message to show the user, with a generic text for transport and
    /// storage failures.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Transport(_) => CONNECTION_FAILED.to_string(),
            ServiceError::Storage(_) => LOCAL_STORAGE_FAILED.to_string(),
            ServiceError::NotFound(message) | ServiceError::InvalidTransition(message) => message.clone(),
            other => other.user_message_or(FIX_HIGHLIGHTED),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    #[test]
    fn status_401_is_unauthorized() {
        assert!(ServiceError::from_status(401, "x").is_unauthorized());
        assert!(matches!(ServiceError::from_status(422, "y"), ServiceError::Api { status: 422, .. }));
    }

    #[test]
    fn user_message_prefers_own_text() {
        let mut errors = FieldErrors::default();
        errors.insert(Field::Amount, "Informe um valor maior que zero.");
        assert_eq!(ServiceError::Validation(errors).user_message_or("fb"), "Informe um valor maior que zero.");
        assert_eq!(ServiceError::Transport("boom".into()).user_message_or("fb"), "fb");
        assert_eq!(
            ServiceError::Model(ModelError::IncompleteAuth("user")).user_message_or("fb"),
            INCOMPLETE_AUTH
        );
        assert_eq!(ServiceError::Transport("boom".into()).user_message(), CONNECTION_FAILED);
        assert_eq!(ServiceError::InvalidTransition("passo".into()).user_message(), "passo");
    }
}

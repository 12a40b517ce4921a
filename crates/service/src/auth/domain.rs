use common::types::Route;
use models::session::Session;

pub const LOGIN_SUCCESS: &str = "Login realizado! Redirecionando...";
pub const REGISTER_SUCCESS: &str = "Conta criada! Entrando...";
pub const LOGIN_REQUIRED: &str = "Faça login para continuar.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn is_register(self) -> bool {
        matches!(self, AuthMode::Register)
    }

    pub fn success_message(self) -> &'static str {
        match self {
            AuthMode::Login => LOGIN_SUCCESS,
            AuthMode::Register => REGISTER_SUCCESS,
        }
    }
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub session: Session,
    pub message: &'static str,
    pub navigate_to: Route,
}

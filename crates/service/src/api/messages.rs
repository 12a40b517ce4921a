//! Mapping of API error bodies to messages shown to the user.

use serde_json::Value;

pub const UNEXPECTED_RESPONSE: &str = "Resposta inesperada da API. Tente novamente.";
pub const BAD_CREDENTIALS: &str = "Credenciais incorretas. Revise e tente novamente.";
pub const INVALID_DATA: &str = "Dados inválidos. Corrija os campos destacados.";
pub const AUTH_GENERIC: &str = "Não conseguimos completar a solicitação. Tente novamente em instantes.";

pub const SESSION_EXPIRED: &str = "Sessão expirada. Entre novamente.";
pub const LIST_FAILED: &str = "Falha ao carregar despesas";
pub const CREATE_FAILED: &str = "Não foi possível salvar. Tente em instantes.";
pub const UPDATE_FAILED: &str = "Não foi possível atualizar. Tente de novo.";
pub const DELETE_FAILED: &str = "Não foi possível excluir agora.";

/// Auth forms accept a `detail` string or a list of strings.
pub fn auth_message(detail: Option<&Value>, status: u16) -> String {
    match detail {
        Some(Value::String(s)) => return s.clone(),
        Some(Value::Array(items)) => {
            let joined = items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", ");
            if !joined.is_empty() {
                return joined;
            }
        }
        _ => {}
    }
    match status {
        401 => BAD_CREDENTIALS,
        400 => INVALID_DATA,
        _ => AUTH_GENERIC,
    }
    .to_string()
}

/// Expense mutations only use a `detail` string; 401 means the session expired.
pub fn mutation_message(detail: Option<&Value>, status: u16, fallback: &str) -> String {
    match detail {
        Some(Value::String(s)) => s.clone(),
        _ if status == 401 => SESSION_EXPIRED.to_string(),
        _ => fallback.to_string(),
    }
}

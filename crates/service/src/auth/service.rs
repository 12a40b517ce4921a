use std::sync::Arc;

use common::types::Route;
use models::session::{LoginRequest, RegisterRequest};
use tracing::{info, instrument, warn};

use super::domain::{AuthMode, AuthOutcome, LOGIN_REQUIRED};
use crate::api::AuthApi;
use crate::errors::ServiceError;
use crate::session::SessionStore;
use crate::validation::{validate_auth, AuthForm};

/// Auth business service independent of the transport.
pub struct AuthService<A: AuthApi> {
    api: Arc<A>,
    sessions: SessionStore,
}

impl<A: AuthApi> AuthService<A> {
    pub fn new(api: Arc<A>, sessions: SessionStore) -> Self {
        Self { api, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn login(&self, form: &AuthForm) -> Result<AuthOutcome, ServiceError> {
        self.submit(AuthMode::Login, form).await
    }

    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn register(&self, form: &AuthForm) -> Result<AuthOutcome, ServiceError> {
        self.submit(AuthMode::Register, form).await
    }

    /// Validate, call the backend, and persist the returned session.
    pub async fn submit(&self, mode: AuthMode, form: &AuthForm) -> Result<AuthOutcome, ServiceError> {
        validate_auth(form, mode.is_register()).into_result()?;

        let email = form.email.trim().to_string();
        let response = match mode {
            AuthMode::Login => {
                let req = LoginRequest { email, password: form.password.clone() };
                self.api.login(&req).await
            }
            AuthMode::Register => {
                let full_name = Some(form.full_name.trim()).filter(|n| !n.is_empty()).map(str::to_string);
                let req = RegisterRequest { email, password: form.password.clone(), full_name };
                self.api.register(&req).await
            }
        }
        .inspect_err(|e| warn!(event = "auth_failed", ?mode, error = %e))?;

        let session = response.into_session()?;
        self.sessions.persist(&session).await?;
        info!(event = "auth_succeeded", ?mode, user_id = %session.user.id);
        Ok(AuthOutcome { session, message: mode.success_message(), navigate_to: Route::Home })
    }

    pub async fn logout(&self) -> Result<(), ServiceError> {
        self.sessions.clear().await?;
        info!(event = "logged_out");
        Ok(())
    }

    /// Token for a protected page; missing token sends the user to `/login`.
    pub async fn require_session(&self) -> Result<String, ServiceError> {
        self.sessions
            .token()
            .await
            .ok_or_else(|| ServiceError::Unauthorized(LOGIN_REQUIRED.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::messages::BAD_CREDENTIALS;
    use crate::api::mock::{Call, MockBackend, Op};
    use crate::errors::INCOMPLETE_AUTH;
    use crate::storage::MemoryLocalStore;
    use crate::validation::{Field, EMAIL_INVALID};

    fn service(backend: Arc<MockBackend>) -> AuthService<MockBackend> {
        AuthService::new(backend, SessionStore::new(MemoryLocalStore::new()))
    }

    fn form(email: &str, password: &str, full_name: &str) -> AuthForm {
        AuthForm { email: email.into(), password: password.into(), full_name: full_name.into() }
    }

    #[tokio::test]
    async fn login_persists_session() -> Result<(), anyhow::Error> {
        let backend = Arc::new(MockBackend::new());
        backend.add_user("ana@example.com", "segredo123", Some("Ana"));
        let auth = service(backend.clone());

        let outcome = auth.login(&form(" ana@example.com ", "segredo123", "")).await?;
        assert_eq!(outcome.message, "Login realizado! Redirecionando...");
        assert_eq!(outcome.navigate_to, Route::Home);
        assert_eq!(auth.sessions().current().await, Some(outcome.session.clone()));
        assert_eq!(auth.require_session().await?, outcome.session.token);

        auth.logout().await?;
        assert!(auth.require_session().await.unwrap_err().is_unauthorized());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_backend() {
        let backend = Arc::new(MockBackend::new());
        let auth = service(backend.clone());
        match auth.login(&form("ana@", "123", "")).await {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors.get(Field::Email), Some(EMAIL_INVALID));
                assert!(errors.get(Field::Password).is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn wrong_password_maps_to_friendly_message() {
        let backend = Arc::new(MockBackend::new());
        backend.add_user("ana@example.com", "segredo123", None);
        let auth = service(backend);
        let err = auth.login(&form("ana@example.com", "outrasenha", "")).await.unwrap_err();
        assert_eq!(err.user_message(), BAD_CREDENTIALS);
        assert!(auth.sessions().token().await.is_none());
    }

    #[tokio::test]
    async fn register_then_duplicate() -> Result<(), anyhow::Error> {
        let backend = Arc::new(MockBackend::new());
        let auth = service(backend.clone());

        let outcome = auth.register(&form("bia@example.com", "segredo123", "  Bia Souza ")).await?;
        assert_eq!(outcome.message, "Conta criada! Entrando...");
        assert_eq!(outcome.session.user.full_name.as_deref(), Some("Bia Souza"));
        assert_eq!(backend.calls(), vec![Call::Register("bia@example.com".into())]);

        let err = auth.register(&form("bia@example.com", "segredo123", "")).await.unwrap_err();
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(backend.count(Op::Register), 2);
        Ok(())
    }

    struct HalfBackend;

    #[async_trait::async_trait]
    impl AuthApi for HalfBackend {
        async fn login(&self, _: &LoginRequest) -> Result<models::session::TokenResponse, ServiceError> {
            Ok(models::session::TokenResponse { access_token: Some("t".into()), ..Default::default() })
        }
        async fn register(&self, _: &RegisterRequest) -> Result<models::session::TokenResponse, ServiceError> {
            Ok(Default::default())
        }
    }

    #[tokio::test]
    async fn incomplete_response_is_rejected() {
        let auth = AuthService::new(Arc::new(HalfBackend), SessionStore::new(MemoryLocalStore::new()));
        let err = auth.login(&form("ana@example.com", "segredo123", "")).await.unwrap_err();
        assert_eq!(err.user_message(), INCOMPLETE_AUTH);
        assert!(auth.sessions().token().await.is_none());
    }
}

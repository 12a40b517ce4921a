use std::time::Duration;

use async_trait::async_trait;
use models::expense::{Expense, ExpenseInput, ExpensePage};
use models::session::{LoginRequest, RegisterRequest, TokenResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::messages::{self, auth_message, mutation_message};
use crate::api::{AuthApi, ExpenseApi};
use crate::errors::ServiceError;

/// reqwest-backed client for the Spendario REST API.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ServiceError::Transport(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(cfg: &configs::ApiConfig) -> Result<Self, ServiceError> {
        Self::new(cfg.base_url.clone(), cfg.timeout_secs.map(Duration::from_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn auth_call<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<TokenResponse, ServiceError> {
        let resp = self.client.post(self.url(path)).json(body).send().await.map_err(transport)?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await.map_err(transport)?;
        let parsed: Option<Value> = serde_json::from_slice(&bytes).ok();

        if !(200..300).contains(&status) {
            let detail = match &parsed {
                Some(body) => body.get("detail").cloned(),
                None => Some(Value::String(messages::UNEXPECTED_RESPONSE.to_string())),
            };
            let message = auth_message(detail.as_ref(), status);
            warn!(%path, status, "auth request rejected");
            return Err(ServiceError::from_status(status, message));
        }

        // A body without the expected fields surfaces later as an incomplete session.
        Ok(parsed.and_then(|v| serde_json::from_value(v).ok()).unwrap_or_default())
    }

    async fn mutation_result<T: DeserializeOwned>(resp: Response, fallback: &str) -> Result<T, ServiceError> {
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.json::<Value>().await.ok().and_then(|b| b.get("detail").cloned());
            let message = mutation_message(detail.as_ref(), status.as_u16(), fallback);
            return Err(ServiceError::from_status(status.as_u16(), message));
        }
        resp.json::<T>().await.map_err(|e| ServiceError::Transport(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> ServiceError {
    ServiceError::Transport(e.to_string())
}

#[async_trait]
impl AuthApi for HttpApi {
    #[instrument(skip(self, req), fields(email = %req.email))]
    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ServiceError> {
        self.auth_call("/auth/login", req).await
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    async fn register(&self, req: &RegisterRequest) -> Result<TokenResponse, ServiceError> {
        self.auth_call("/auth/register", req).await
    }
}

#[async_trait]
impl ExpenseApi for HttpApi {
    #[instrument(skip(self, token))]
    async fn list(&self, token: &str, page: u32, page_size: u32) -> Result<ExpensePage, ServiceError> {
        let resp = self
            .client
            .get(self.url("/expenses"))
            .query(&[("page", page), ("page_size", page_size)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::from_status(status.as_u16(), messages::LIST_FAILED));
        }
        let page = resp.json::<ExpensePage>().await.map_err(|e| ServiceError::Transport(e.to_string()))?;
        debug!(items = page.items.len(), total = ?page.total, "expenses page received");
        Ok(page)
    }

    #[instrument(skip(self, token, input))]
    async fn create(&self, token: &str, input: &ExpenseInput) -> Result<Expense, ServiceError> {
        let resp = self
            .client
            .post(self.url("/expenses"))
            .bearer_auth(token)
            .json(input)
            .send()
            .await
            .map_err(transport)?;
        Self::mutation_result(resp, messages::CREATE_FAILED).await
    }

    #[instrument(skip(self, token, input))]
    async fn update(&self, token: &str, id: &str, input: &ExpenseInput) -> Result<Expense, ServiceError> {
        let resp = self
            .client
            .put(self.url(&format!("/expenses/{id}")))
            .bearer_auth(token)
            .json(input)
            .send()
            .await
            .map_err(transport)?;
        Self::mutation_result(resp, messages::UPDATE_FAILED).await
    }

    #[instrument(skip(self, token))]
    async fn delete(&self, token: &str, id: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(self.url(&format!("/expenses/{id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::from_status(status.as_u16(), messages::DELETE_FAILED));
        }
        Ok(())
    }
}

use std::sync::Arc;

use models::expense::Expense;
use tracing::{debug, info, instrument, warn};

use crate::api::messages::{CREATE_FAILED, DELETE_FAILED, LIST_FAILED, UPDATE_FAILED};
use crate::api::ExpenseApi;
use crate::categories::CategoryResolver;
use crate::errors::ServiceError;
use crate::pagination::PaginationState;
use crate::session::SessionStore;
use crate::validation::{ExpenseForm, Field, FieldErrors};

pub const NO_TOKEN_LIST: &str = "Faça login novamente para carregar suas despesas.";
pub const NO_TOKEN_CREATE: &str = "Faça login novamente para lançar despesas.";
pub const NO_TOKEN_UPDATE: &str = "Sessão expirada. Refaça login.";
pub const NO_TOKEN_DELETE: &str = "Sessão expirada. Refaça login para excluir.";
pub const CREATED: &str = "Despesa salva! Enter novamente lança outra.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Edit form opened for one expense.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub id: String,
    pub form: ExpenseForm,
    pub errors: FieldErrors,
}

/// One page of expenses plus the create, edit and delete flows around it.
///
/// Every network failure is recorded as a message and leaves the items and
/// pagination as they were.
pub struct ExpenseListController<A: ExpenseApi> {
    api: Arc<A>,
    sessions: SessionStore,
    resolver: CategoryResolver,
    status: ListStatus,
    items: Vec<Expense>,
    pagination: PaginationState,
    list_message: Option<String>,
    form_message: Option<String>,
    pending_delete: Option<String>,
    editing: Option<EditSession>,
}

impl<A: ExpenseApi> ExpenseListController<A> {
    pub fn new(api: Arc<A>, sessions: SessionStore, resolver: CategoryResolver) -> Self {
        Self {
            api,
            sessions,
            resolver,
            status: ListStatus::Idle,
            items: Vec::new(),
            pagination: PaginationState::default(),
            list_message: None,
            form_message: None,
            pending_delete: None,
            editing: None,
        }
    }

    pub fn status(&self) -> ListStatus { self.status }
    pub fn items(&self) -> &[Expense] { &self.items }
    pub fn pagination(&self) -> PaginationState { self.pagination }
    pub fn resolver(&self) -> &CategoryResolver { &self.resolver }
    pub fn list_message(&self) -> Option<&str> { self.list_message.as_deref() }
    pub fn form_message(&self) -> Option<&str> { self.form_message.as_deref() }
    pub fn pending_delete(&self) -> Option<&str> { self.pending_delete.as_deref() }
    pub fn editing(&self) -> Option<&EditSession> { self.editing.as_ref() }

    /// Loaded with nothing to show.
    pub fn is_empty(&self) -> bool {
        self.status == ListStatus::Loaded && self.pagination.total == 0
    }

    /// Load `page`. When the server reports fewer pages than that, the page
    /// is clamped and fetched once more.
    #[instrument(skip(self))]
    pub async fn fetch_page(&mut self, page: u32) -> Result<(), ServiceError> {
        let Some(token) = self.sessions.token().await else {
            self.status = ListStatus::Error;
            self.list_message = Some(NO_TOKEN_LIST.to_string());
            return Err(ServiceError::Unauthorized(NO_TOKEN_LIST.to_string()));
        };

        let mut target = page.max(1);
        for _ in 0..2 {
            self.status = ListStatus::Loading;
            self.list_message = None;
            let response = match self.api.list(&token, target, self.pagination.page_size).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(event = "expenses_fetch_failed", page = target, error = %e);
                    self.status = ListStatus::Error;
                    self.list_message = Some(e.user_message_or(LIST_FAILED));
                    return Err(e);
                }
            };

            self.pagination.total = response.total_items();
            self.pagination.page = target;
            self.items = response.items;
            self.status = ListStatus::Loaded;
            debug!(event = "expenses_loaded", page = target, total = self.pagination.total, items = self.items.len());

            if !self.pagination.clamp_page() {
                break;
            }
            target = self.pagination.page;
        }
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<(), ServiceError> {
        self.fetch_page(self.pagination.page).await
    }

    /// Returns whether a fetch happened. Out-of-range pages and requests made
    /// while loading are ignored.
    pub async fn go_to_page(&mut self, page: u32) -> Result<bool, ServiceError> {
        if !self.pagination.contains(page) || self.status == ListStatus::Loading {
            return Ok(false);
        }
        self.fetch_page(page).await?;
        Ok(true)
    }

    pub async fn next_page(&mut self) -> Result<bool, ServiceError> {
        self.go_to_page(self.pagination.page.saturating_add(1)).await
    }

    pub async fn prev_page(&mut self) -> Result<bool, ServiceError> {
        self.go_to_page(self.pagination.page.saturating_sub(1)).await
    }

    /// Create from the quick-entry form. The new record goes to the head of
    /// the list without a re-fetch and the form is cleared for the next entry.
    #[instrument(skip(self, form))]
    pub async fn create(&mut self, form: &mut ExpenseForm) -> Result<Expense, ServiceError> {
        self.form_message = None;
        let input = form.to_input(&self.resolver)?;
        let Some(token) = self.sessions.token().await else {
            self.form_message = Some(NO_TOKEN_CREATE.to_string());
            return Err(ServiceError::Unauthorized(NO_TOKEN_CREATE.to_string()));
        };

        match self.api.create(&token, &input).await {
            Ok(created) => {
                self.items.insert(0, created.clone());
                self.pagination.total += 1;
                self.form_message = Some(CREATED.to_string());
                form.clear_entry();
                info!(event = "expense_created", id = %created.id, total = self.pagination.total);
                Ok(created)
            }
            Err(e) => {
                warn!(event = "expense_create_failed", error = %e);
                self.form_message = Some(e.user_message_or(CREATE_FAILED));
                Err(e)
            }
        }
    }

    /// Open the edit form prefilled from the listed item.
    pub fn begin_edit(&mut self, id: &str) -> Result<&EditSession, ServiceError> {
        let expense = self.items.iter().find(|e| e.id == id).ok_or_else(|| ServiceError::not_found("expense"))?;
        let form = ExpenseForm::from_expense(expense, &self.resolver);
        Ok(self.editing.insert(EditSession { id: id.to_string(), form, errors: FieldErrors::default() }))
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut ExpenseForm> {
        self.editing.as_mut().map(|s| &mut s.form)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Send the open edit form; it closes on success.
    pub async fn submit_edit(&mut self) -> Result<Expense, ServiceError> {
        let Some(session) = self.editing.clone() else {
            return Err(ServiceError::InvalidTransition("nenhuma despesa em edição".into()));
        };
        match self.update(&session.id, &session.form).await {
            Ok(updated) => {
                self.editing = None;
                Ok(updated)
            }
            Err(e) => {
                if let (Some(open), ServiceError::Validation(errors)) = (self.editing.as_mut(), &e) {
                    open.errors = errors.clone();
                }
                Err(e)
            }
        }
    }

    /// Replace the expense, patch it in place, then re-fetch the current page.
    /// A failed re-fetch is reported on the list; the update still succeeds.
    #[instrument(skip(self, form))]
    pub async fn update(&mut self, id: &str, form: &ExpenseForm) -> Result<Expense, ServiceError> {
        let input = form.to_input(&self.resolver)?;
        let Some(token) = self.sessions.token().await else {
            if let Some(open) = self.editing.as_mut() {
                open.errors.insert(Field::Category, NO_TOKEN_UPDATE);
            }
            return Err(ServiceError::Unauthorized(NO_TOKEN_UPDATE.to_string()));
        };

        let updated = match self.api.update(&token, id, &input).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(event = "expense_update_failed", %id, error = %e);
                self.list_message = Some(e.user_message_or(UPDATE_FAILED));
                return Err(e);
            }
        };

        if let Some(slot) = self.items.iter_mut().find(|e| e.id == updated.id) {
            *slot = updated.clone();
        }
        info!(event = "expense_updated", id = %updated.id);

        if let Err(e) = self.refresh().await {
            debug!(event = "refetch_after_update_failed", error = %e);
        }
        Ok(updated)
    }

    pub fn request_delete(&mut self, id: &str) -> Result<(), ServiceError> {
        if !self.items.iter().any(|e| e.id == id) {
            return Err(ServiceError::not_found("expense"));
        }
        self.pending_delete = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Fire the DELETE for the pending id. The pending mark is cleared
    /// whatever the outcome.
    #[instrument(skip(self))]
    pub async fn confirm_delete(&mut self) -> Result<(), ServiceError> {
        let Some(id) = self.pending_delete.take() else {
            return Err(ServiceError::InvalidTransition("nenhuma exclusão pendente".into()));
        };
        let Some(token) = self.sessions.token().await else {
            self.list_message = Some(NO_TOKEN_DELETE.to_string());
            return Err(ServiceError::Unauthorized(NO_TOKEN_DELETE.to_string()));
        };

        if let Err(e) = self.api.delete(&token, &id).await {
            warn!(event = "expense_delete_failed", %id, error = %e);
            self.list_message = Some(DELETE_FAILED.to_string());
            return Err(e);
        }

        self.items.retain(|e| e.id != id);
        self.pagination.total = self.pagination.total.saturating_sub(1);
        let clamped = self.pagination.clamp_page();
        info!(event = "expense_deleted", %id, total = self.pagination.total, clamped, page = self.pagination.page);

        if let Err(e) = self.refresh().await {
            debug!(event = "refetch_after_delete_failed", error = %e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, MockBackend, Op};
    use crate::storage::{keys, LocalStore, MemoryLocalStore};
    use crate::validation::AMOUNT_INVALID;
    use chrono::NaiveDate;

    async fn setup(seeded: usize, with_token: bool) -> (Arc<MockBackend>, ExpenseListController<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        backend.accept_token("tok");
        backend.seed_expenses(seeded);
        let store = MemoryLocalStore::new();
        if with_token {
            store.set_item(keys::TOKEN, "tok".into()).await.unwrap();
        }
        let controller = ExpenseListController::new(backend.clone(), SessionStore::new(store), CategoryResolver::defaults());
        (backend, controller)
    }

    fn market_form() -> ExpenseForm {
        ExpenseForm {
            amount: "120,50".into(),
            description: "Mercado da semana".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            category_input: "Supermercado".into(),
            currency: "brl".into(),
        }
    }

    #[tokio::test]
    async fn missing_token_fails_without_request() {
        let (backend, mut list) = setup(3, false).await;
        let err = list.fetch_page(1).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(list.status(), ListStatus::Error);
        assert_eq!(list.list_message(), Some(NO_TOKEN_LIST));
        assert!(backend.calls().is_empty());

        assert!(list.create(&mut market_form()).await.is_err());
        assert_eq!(list.form_message(), Some(NO_TOKEN_CREATE));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn fifty_five_items_paginate() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(55, true).await;
        list.fetch_page(1).await?;
        assert_eq!(list.items().len(), 50);
        assert_eq!(list.pagination().label(), "Página 1 de 2");

        assert!(list.next_page().await?);
        assert_eq!(list.items().len(), 5);
        assert_eq!(list.pagination().range(), (51, 55));
        assert_eq!(backend.calls().last(), Some(&Call::List { page: 2, page_size: 50 }));

        // already on the last page
        assert!(!list.next_page().await?);
        assert_eq!(backend.count(Op::List), 2);

        assert!(list.prev_page().await?);
        assert_eq!(list.items().len(), 50);
        assert_eq!(list.pagination().page, 1);
        assert_eq!(backend.calls().last(), Some(&Call::List { page: 1, page_size: 50 }));
        assert!(!list.prev_page().await?);
        assert_eq!(backend.count(Op::List), 3);
        Ok(())
    }

    #[tokio::test]
    async fn create_prepends_without_refetch() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(2, true).await;
        list.fetch_page(1).await?;

        let mut form = market_form();
        let created = list.create(&mut form).await?;
        assert_eq!(created.amount, "120.50");
        assert_eq!(created.currency, "BRL");
        assert_eq!(list.items()[0].description, "Mercado da semana");
        assert_eq!(list.pagination().total, 3);
        assert_eq!(list.form_message(), Some(CREATED));
        assert_eq!(backend.count(Op::List), 1);

        // ready for the next entry, date and currency kept
        assert!(form.amount.is_empty() && form.description.is_empty() && form.category_input.is_empty());
        assert_eq!(form.date, market_form().date);
        assert_eq!(form.currency, market_form().currency);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_amount_never_hits_network() {
        let (backend, mut list) = setup(0, true).await;
        for amount in ["0", "-3", "abc", "0,001"] {
            let mut form = ExpenseForm { amount: amount.into(), ..market_form() };
            match list.create(&mut form).await {
                Err(ServiceError::Validation(errors)) => assert_eq!(errors.get(Field::Amount), Some(AMOUNT_INVALID)),
                other => panic!("expected validation error for {amount}, got {other:?}"),
            }
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_create_keeps_list() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(1, true).await;
        list.fetch_page(1).await?;
        backend.fail_next(Op::Create, 500);
        let mut form = market_form();
        assert!(list.create(&mut form).await.is_err());
        assert_eq!(list.form_message(), Some(CREATE_FAILED));
        assert_eq!(form, market_form());
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.pagination().total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn edit_replaces_in_place_and_refetches() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(3, true).await;
        list.fetch_page(1).await?;
        let id = list.items()[1].id.clone();

        let session = list.begin_edit(&id)?;
        assert_eq!(session.form.category_input, "Alimentação");
        if let Some(form) = list.edit_form_mut() {
            form.description = "Jantar".into();
        }
        let updated = list.submit_edit().await?;
        assert_eq!(updated.description, "Jantar");
        assert!(list.editing().is_none());
        assert_eq!(list.items()[1].description, "Jantar");
        assert_eq!(backend.count(Op::List), 2);
        Ok(())
    }

    #[tokio::test]
    async fn update_succeeds_even_if_refetch_fails() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(3, true).await;
        list.fetch_page(1).await?;
        let id = list.items()[0].id.clone();
        backend.fail_next(Op::List, 500);

        let form = ExpenseForm { description: "Padaria".into(), ..market_form() };
        let updated = list.update(&id, &form).await?;
        assert_eq!(updated.description, "Padaria");
        assert_eq!(list.items()[0].description, "Padaria");
        assert_eq!(list.status(), ListStatus::Error);
        assert_eq!(list.list_message(), Some(LIST_FAILED));
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_reports_on_list() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(1, true).await;
        list.fetch_page(1).await?;
        let before = list.items().to_vec();
        backend.fail_next(Op::Update, 503);
        assert!(list.update(&before[0].id, &market_form()).await.is_err());
        assert_eq!(list.list_message(), Some(UPDATE_FAILED));
        assert_eq!(list.items(), &before[..]);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_last_item_of_page_two_clamps() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(51, true).await;
        list.fetch_page(2).await?;
        assert_eq!(list.items().len(), 1);
        let id = list.items()[0].id.clone();

        list.request_delete(&id)?;
        assert_eq!(list.pending_delete(), Some(id.as_str()));
        list.confirm_delete().await?;

        assert!(list.pending_delete().is_none());
        assert_eq!(list.pagination().page, 1);
        assert_eq!(list.pagination().total, 50);
        assert_eq!(backend.calls().last(), Some(&Call::List { page: 1, page_size: 50 }));
        assert_eq!(list.items().len(), 50);
        Ok(())
    }

    #[tokio::test]
    async fn delete_on_first_page_refetches_same_page() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(3, true).await;
        list.fetch_page(1).await?;
        let id = list.items()[1].id.clone();

        list.request_delete(&id)?;
        list.confirm_delete().await?;

        assert_eq!(backend.count(Op::Delete), 1);
        assert_eq!(backend.count(Op::List), 2);
        assert!(matches!(backend.calls().last(), Some(Call::List { page: 1, .. })));
        assert_eq!(list.pagination().page, 1);
        assert_eq!(list.pagination().total, 2);
        assert_eq!(list.items().len(), 2);
        assert!(list.items().iter().all(|e| e.id != id));
        assert_eq!(backend.expenses().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn cancel_and_failed_delete_clear_pending() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(2, true).await;
        list.fetch_page(1).await?;
        let id = list.items()[0].id.clone();

        list.request_delete(&id)?;
        list.cancel_delete();
        assert!(list.confirm_delete().await.is_err());
        assert_eq!(backend.count(Op::Delete), 0);

        list.request_delete(&id)?;
        backend.fail_next(Op::Delete, 500);
        assert!(list.confirm_delete().await.is_err());
        assert!(list.pending_delete().is_none());
        assert_eq!(list.list_message(), Some(DELETE_FAILED));
        assert_eq!(list.items().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_clamps_when_page_is_past_the_end() -> Result<(), anyhow::Error> {
        let (backend, mut list) = setup(3, true).await;
        list.fetch_page(4).await?;
        assert_eq!(list.pagination().page, 1);
        assert_eq!(list.items().len(), 3);
        assert_eq!(backend.count(Op::List), 2);
        Ok(())
    }
}

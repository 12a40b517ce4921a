//! In-memory backend implementing both API traits.
//!
//! Mirrors the REST backend closely enough for the controller and service
//! unit tests. Expenses are kept newest first, pages are sliced by
//! `page`/`page_size`, and failures can be injected per operation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use models::expense::{Expense, ExpenseInput, ExpensePage};
use models::session::{LoginRequest, RegisterRequest, TokenResponse, User};

use super::messages::{self, auth_message, mutation_message};
use super::{AuthApi, ExpenseApi};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Login,
    Register,
    List,
    Create,
    Update,
    Delete,
}

/// One request as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Register(String),
    List { page: u32, page_size: u32 },
    Create,
    Update(String),
    Delete(String),
}

#[derive(Default)]
struct State {
    users: HashMap<String, (String, User)>,
    tokens: HashMap<String, String>,
    expenses: Vec<Expense>,
    failures: HashMap<Op, VecDeque<u16>>,
    calls: Vec<Call>,
    next_id: u64,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<State>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an account that can log in with `password`.
    pub fn add_user(&self, email: &str, password: &str, full_name: Option<&str>) -> User {
        let mut st = self.state();
        st.next_id += 1;
        let user = User {
            id: format!("user-{}", st.next_id),
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
            created_at: None,
        };
        st.users.insert(email.to_string(), (password.to_string(), user.clone()));
        user
    }

    /// Make `token` valid for expense calls without going through login.
    pub fn accept_token(&self, token: &str) {
        self.state().tokens.insert(token.to_string(), "user-0".to_string());
    }

    /// Seed `count` expenses; the first one is the newest.
    pub fn seed_expenses(&self, count: usize) {
        let mut st = self.state();
        for i in 0..count {
            st.next_id += 1;
            let id = format!("exp-{}", st.next_id);
            let day = u32::try_from(28 - (i % 28)).unwrap_or(1);
            st.expenses.push(Expense {
                id,
                amount: format!("{}.00", 10 + i),
                currency: "BRL".to_string(),
                description: format!("Despesa {}", i + 1),
                transaction_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap_or_default(),
                category_id: 1,
                user_id: Some("user-0".to_string()),
                created_at: None,
            });
        }
    }

    /// The next `op` request fails with `status`. Queued failures are consumed in order.
    pub fn fail_next(&self, op: Op, status: u16) {
        self.state().failures.entry(op).or_default().push_back(status);
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.state().expenses.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| {
                matches!(
                    (op, c),
                    (Op::Login, Call::Login(_))
                        | (Op::Register, Call::Register(_))
                        | (Op::List, Call::List { .. })
                        | (Op::Create, Call::Create)
                        | (Op::Update, Call::Update(_))
                        | (Op::Delete, Call::Delete(_))
                )
            })
            .count()
    }
}

impl State {
    fn injected(&mut self, op: Op) -> Option<u16> {
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        self.next_id += 1;
        let token = format!("token-{}", self.next_id);
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    fn owner(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.expenses.iter().position(|e| e.id == id)
    }
}

fn auth_failure(status: u16) -> ServiceError {
    ServiceError::from_status(status, auth_message(None, status))
}

fn mutation_failure(status: u16, detail: Option<&str>, fallback: &str) -> ServiceError {
    let detail = detail.map(|d| serde_json::Value::String(d.to_string()));
    ServiceError::from_status(status, mutation_message(detail.as_ref(), status, fallback))
}

fn apply(input: &ExpenseInput, target: &mut Expense) {
    target.amount = input.amount.clone();
    target.currency = input.currency.clone();
    target.description = input.description.clone();
    target.transaction_date = input.transaction_date;
    target.category_id = input.category_id;
}

#[async_trait]
impl AuthApi for MockBackend {
    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::Login(req.email.clone()));
        if let Some(status) = st.injected(Op::Login) {
            return Err(auth_failure(status));
        }
        let user = match st.users.get(&req.email) {
            Some((password, user)) if *password == req.password => user.clone(),
            _ => return Err(auth_failure(401)),
        };
        let token = st.issue_token(&user.id);
        Ok(TokenResponse { access_token: Some(token), token_type: Some("bearer".into()), user: Some(user) })
    }

    async fn register(&self, req: &RegisterRequest) -> Result<TokenResponse, ServiceError> {
        {
            let mut st = self.state();
            st.calls.push(Call::Register(req.email.clone()));
            if let Some(status) = st.injected(Op::Register) {
                return Err(auth_failure(status));
            }
            if st.users.contains_key(&req.email) {
                let detail = serde_json::Value::String("Email already registered".into());
                return Err(ServiceError::from_status(400, auth_message(Some(&detail), 400)));
            }
        }
        let user = self.add_user(&req.email, &req.password, req.full_name.as_deref());
        let token = self.state().issue_token(&user.id);
        Ok(TokenResponse { access_token: Some(token), token_type: Some("bearer".into()), user: Some(user) })
    }
}

#[async_trait]
impl ExpenseApi for MockBackend {
    async fn list(&self, token: &str, page: u32, page_size: u32) -> Result<ExpensePage, ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::List { page, page_size });
        if let Some(status) = st.injected(Op::List) {
            return Err(ServiceError::from_status(status, messages::LIST_FAILED));
        }
        if st.owner(token).is_none() {
            return Err(ServiceError::from_status(401, messages::LIST_FAILED));
        }
        let size = page_size.max(1) as usize;
        let start = (page.max(1) as usize - 1) * size;
        let items = st.expenses.iter().skip(start).take(size).cloned().collect();
        Ok(ExpensePage {
            items,
            total: Some(st.expenses.len() as u64),
            page: Some(page),
            page_size: Some(page_size),
        })
    }

    async fn create(&self, token: &str, input: &ExpenseInput) -> Result<Expense, ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::Create);
        if let Some(status) = st.injected(Op::Create) {
            return Err(mutation_failure(status, None, messages::CREATE_FAILED));
        }
        let Some(owner) = st.owner(token) else {
            return Err(mutation_failure(401, None, messages::CREATE_FAILED));
        };
        st.next_id += 1;
        let expense = Expense {
            id: format!("exp-{}", st.next_id),
            amount: input.amount.clone(),
            currency: input.currency.clone(),
            description: input.description.clone(),
            transaction_date: input.transaction_date,
            category_id: input.category_id,
            user_id: Some(owner),
            created_at: None,
        };
        st.expenses.insert(0, expense.clone());
        Ok(expense)
    }

    async fn update(&self, token: &str, id: &str, input: &ExpenseInput) -> Result<Expense, ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::Update(id.to_string()));
        if let Some(status) = st.injected(Op::Update) {
            return Err(mutation_failure(status, None, messages::UPDATE_FAILED));
        }
        if st.owner(token).is_none() {
            return Err(mutation_failure(401, None, messages::UPDATE_FAILED));
        }
        let Some(idx) = st.position(id) else {
            return Err(mutation_failure(404, Some("Expense not found"), messages::UPDATE_FAILED));
        };
        apply(input, &mut st.expenses[idx]);
        Ok(st.expenses[idx].clone())
    }

    async fn delete(&self, token: &str, id: &str) -> Result<(), ServiceError> {
        let mut st = self.state();
        st.calls.push(Call::Delete(id.to_string()));
        if let Some(status) = st.injected(Op::Delete) {
            return Err(ServiceError::from_status(status, messages::DELETE_FAILED));
        }
        if st.owner(token).is_none() {
            return Err(ServiceError::from_status(401, messages::DELETE_FAILED));
        }
        let Some(idx) = st.position(id) else {
            return Err(ServiceError::from_status(404, messages::DELETE_FAILED));
        };
        st.expenses.remove(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_are_sliced_newest_first() -> Result<(), anyhow::Error> {
        let backend = MockBackend::new();
        backend.accept_token("t");
        backend.seed_expenses(55);

        let first = backend.list("t", 1, 50).await?;
        assert_eq!(first.items.len(), 50);
        assert_eq!(first.total, Some(55));
        assert_eq!(first.items[0].description, "Despesa 1");

        let second = backend.list("t", 2, 50).await?;
        assert_eq!(second.items.len(), 5);
        assert!(backend.list("t", 3, 50).await?.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn login_checks_password() -> Result<(), anyhow::Error> {
        let backend = MockBackend::new();
        backend.add_user("ana@example.com", "segredo123", Some("Ana"));

        let ok = backend
            .login(&LoginRequest { email: "ana@example.com".into(), password: "segredo123".into() })
            .await?;
        assert!(ok.into_session().is_ok());

        let err = backend
            .login(&LoginRequest { email: "ana@example.com".into(), password: "errada".into() })
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message_or(""), messages::BAD_CREDENTIALS);
        Ok(())
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let backend = MockBackend::new();
        backend.accept_token("t");
        backend.fail_next(Op::List, 500);
        assert!(backend.list("t", 1, 50).await.is_err());
        assert!(backend.list("t", 1, 50).await.is_ok());
        assert_eq!(backend.count(Op::List), 2);
    }
}

//! Two-step onboarding wizard persisted under `spendario.onboarding`.

use std::sync::Arc;

use chrono::Utc;
use common::types::Route;
use models::onboarding::{OnboardingState, OnboardingStatus, COUNTRIES, CURRENCIES, DEFAULT_CATEGORIES};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::storage::{keys, read_json, write_json, LocalStore};
use crate::validation::{Field, FieldErrors};

pub const SAVED_FOR_LATER: &str = "Progresso salvo. Você pode continuar depois.";
pub const SKIPPED: &str = "Onboarding pulado. Você pode voltar a qualquer momento.";
pub const COMPLETED: &str = "Onboarding concluído! Redirecionando para o painel...";

const UNKNOWN_COUNTRY: &str = "Escolha um país da lista.";
const UNKNOWN_CURRENCY: &str = "Escolha uma moeda da lista.";

/// `(title, description)` of each step.
pub const STEPS: [(&str, &str); 2] = [
    ("País e moeda", "Escolha o país e a moeda padrão para relatórios e lançamento."),
    ("Categorias favoritas", "Confirme as categorias iniciais para acelerar o autocomplete."),
];

/// Where to go after a transition that leaves the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOutcome {
    pub navigate_to: Option<Route>,
    pub message: Option<&'static str>,
}

impl WizardOutcome {
    fn stay() -> Self {
        Self { navigate_to: None, message: None }
    }

    fn leave(message: &'static str) -> Self {
        Self { navigate_to: Some(Route::Dashboard), message: Some(message) }
    }
}

pub struct OnboardingWizard {
    store: Arc<dyn LocalStore>,
    state: OnboardingState,
}

impl OnboardingWizard {
    /// Restore the last snapshot (defaults when absent or corrupt, field by
    /// field when partial) and persist it straight away.
    pub async fn hydrate(store: Arc<dyn LocalStore>) -> Result<Self, ServiceError> {
        let mut state = read_json::<OnboardingState>(&*store, keys::ONBOARDING)
            .await
            .unwrap_or_default()
            .with_defaults_filled();
        // older snapshots stored "BRL - Real brasileiro"
        if let Some((code, _)) = state.currency.split_once(" - ") {
            state.currency = code.trim().to_string();
        }
        let mut wizard = Self { store, state };
        wizard.persist().await?;
        Ok(wizard)
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn step(&self) -> u8 {
        self.state.step
    }

    pub fn status(&self) -> OnboardingStatus {
        self.state.status
    }

    async fn persist(&mut self) -> Result<(), ServiceError> {
        self.state.updated_at = Some(Utc::now());
        write_json(&*self.store, keys::ONBOARDING, &self.state).await
    }

    pub async fn set_country(&mut self, country: &str) -> Result<(), ServiceError> {
        let Some(known) = COUNTRIES.iter().find(|c| c.eq_ignore_ascii_case(country.trim())) else {
            return Err(field_error(Field::Country, UNKNOWN_COUNTRY));
        };
        self.state.country = known.to_string();
        self.persist().await
    }

    pub async fn set_currency(&mut self, currency: &str) -> Result<(), ServiceError> {
        let Some((code, _)) = CURRENCIES.iter().find(|(c, _)| c.eq_ignore_ascii_case(currency.trim())) else {
            return Err(field_error(Field::Currency, UNKNOWN_CURRENCY));
        };
        self.state.currency = code.to_string();
        self.persist().await
    }

    /// Select or deselect one of the offered categories; returns whether it
    /// is now selected.
    pub async fn toggle_category(&mut self, label: &str) -> Result<bool, ServiceError> {
        if !DEFAULT_CATEGORIES.contains(&label) {
            return Err(ServiceError::not_found("category"));
        }
        let selected = if let Some(pos) = self.state.categories.iter().position(|c| c == label) {
            self.state.categories.remove(pos);
            false
        } else {
            self.state.categories.push(label.to_string());
            true
        };
        self.persist().await?;
        Ok(selected)
    }

    /// Step 1 → 2; the status goes back to in progress.
    pub async fn next(&mut self) -> Result<WizardOutcome, ServiceError> {
        self.expect_step(1, "next")?;
        self.state.step = 2;
        self.state.status = OnboardingStatus::InProgress;
        self.persist().await?;
        Ok(WizardOutcome::stay())
    }

    pub async fn back(&mut self) -> Result<WizardOutcome, ServiceError> {
        self.expect_step(2, "back")?;
        self.state.step = 1;
        self.persist().await?;
        Ok(WizardOutcome::stay())
    }

    #[instrument(skip(self))]
    pub async fn finish(&mut self) -> Result<WizardOutcome, ServiceError> {
        self.expect_step(2, "finish")?;
        self.leave(OnboardingStatus::Completed, COMPLETED).await
    }

    #[instrument(skip(self))]
    pub async fn skip(&mut self) -> Result<WizardOutcome, ServiceError> {
        self.leave(OnboardingStatus::Skipped, SKIPPED).await
    }

    #[instrument(skip(self))]
    pub async fn save_for_later(&mut self) -> Result<WizardOutcome, ServiceError> {
        self.leave(OnboardingStatus::InProgress, SAVED_FOR_LATER).await
    }

    async fn leave(&mut self, status: OnboardingStatus, message: &'static str) -> Result<WizardOutcome, ServiceError> {
        self.state.status = status;
        self.persist().await?;
        info!(event = "onboarding_left", ?status, step = self.state.step, country = %self.state.country, currency = %self.state.currency);
        Ok(WizardOutcome::leave(message))
    }

    fn expect_step(&self, step: u8, action: &str) -> Result<(), ServiceError> {
        if self.state.step == step {
            return Ok(());
        }
        warn!(event = "onboarding_invalid_transition", action, step = self.state.step);
        Err(ServiceError::InvalidTransition(format!("'{action}' não é possível no passo {}", self.state.step)))
    }
}

fn field_error(field: Field, message: &str) -> ServiceError {
    let mut errors = FieldErrors::default();
    errors.insert(field, message);
    ServiceError::Validation(errors)
}

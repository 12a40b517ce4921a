use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const COUNTRIES: [&str; 3] = ["Brasil", "Portugal", "Estados Unidos"];

/// `(code, name)` pairs offered on step 1.
pub const CURRENCIES: [(&str, &str); 3] = [
    ("BRL", "Real brasileiro"),
    ("EUR", "Euro"),
    ("USD", "Dólar americano"),
];

pub const DEFAULT_COUNTRY: &str = "Brasil";
pub const DEFAULT_CURRENCY: &str = "BRL";

pub const DEFAULT_CATEGORIES: [&str; 9] = [
    "Alimentação",
    "Transporte",
    "Moradia",
    "Assinaturas",
    "Saúde",
    "Lazer",
    "Educação",
    "Mercado",
    "Outros",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    #[default]
    InProgress,
    Completed,
    Skipped,
}

/// Wizard snapshot persisted under `spendario.onboarding`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OnboardingState {
    #[serde(default)]
    pub step: u8,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub status: OnboardingStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self {
            step: 1,
            country: DEFAULT_COUNTRY.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            status: OnboardingStatus::InProgress,
            updated_at: None,
        }
    }
}

impl OnboardingState {
    /// Replace blank or out-of-range fields with their defaults.
    pub fn with_defaults_filled(mut self) -> Self {
        let defaults = OnboardingState::default();
        if !matches!(self.step, 1 | 2) {
            self.step = defaults.step;
        }
        if self.country.trim().is_empty() {
            self.country = defaults.country;
        }
        if self.currency.trim().is_empty() {
            self.currency = defaults.currency;
        }
        if self.categories.is_empty() {
            self.categories = defaults.categories;
        }
        self
    }
}

pub fn currency_name(code: &str) -> Option<&'static str> {
    CURRENCIES.iter().find(|(c, _)| c.eq_ignore_ascii_case(code)).map(|(_, name)| *name)
}

//! Form validation
//!
//! Pure functions from a form snapshot to field errors. Nothing here touches
//! the network or storage; callers decide whether to submit based on the
//! returned map being empty.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use common::utils::text::char_len;
use models::expense::{Expense, ExpenseInput};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::categories::CategoryResolver;
use crate::errors::ServiceError;

pub const AMOUNT_INVALID: &str = "Informe um valor maior que zero.";
pub const DESCRIPTION_MISSING: &str = "Adicione uma descrição curta.";
pub const DATE_MISSING: &str = "Escolha a data.";
pub const CATEGORY_UNKNOWN: &str = "Selecione uma categoria da lista.";
pub const EMAIL_INVALID: &str = "Informe um e-mail válido.";
pub const PASSWORD_TOO_SHORT: &str = "A senha precisa ter pelo menos 8 caracteres.";
pub const FULL_NAME_TOO_SHORT: &str = "Use pelo menos 3 caracteres.";

pub const DEFAULT_CURRENCY: &str = "BRL";
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const FULL_NAME_MIN_CHARS: usize = 3;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Amount,
    Description,
    Date,
    Category,
    Email,
    Password,
    FullName,
    Name,
    Country,
    Currency,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Amount => "amount",
            Field::Description => "description",
            Field::Date => "date",
            Field::Category => "categoryInput",
            Field::Email => "email",
            Field::Password => "password",
            Field::FullName => "fullName",
            Field::Name => "name",
            Field::Country => "country",
            Field::Currency => "currency",
        }
    }
}

/// Field name → message; fields without problems are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    /// Keep only the entries for `fields`.
    pub fn retain_fields(&mut self, fields: &BTreeSet<Field>) {
        self.0.retain(|f, _| fields.contains(f));
    }

    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// Raw values of the expense form, as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    pub amount: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub category_input: String,
    pub currency: String,
}

impl ExpenseForm {
    /// Empty form dated today in BRL.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            description: String::new(),
            date: Some(today),
            category_input: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Prefill from an existing expense; the category input shows the label
    /// the resolver knows for its id, or nothing.
    pub fn from_expense(expense: &Expense, resolver: &CategoryResolver) -> Self {
        Self {
            amount: expense.amount.clone(),
            description: expense.description.clone(),
            date: Some(expense.transaction_date),
            category_input: resolver.label_for(expense.category_id).unwrap_or_default().to_string(),
            currency: expense.currency.clone(),
        }
    }

    /// Clear what the user types per entry, keeping date and currency for
    /// the next one.
    pub fn clear_entry(&mut self) {
        self.amount.clear();
        self.description.clear();
        self.category_input.clear();
    }

    /// Wire payload for a valid form.
    pub fn to_input(&self, resolver: &CategoryResolver) -> Result<ExpenseInput, ServiceError> {
        validate_expense(self, resolver).into_result()?;
        let amount = parse_amount(&self.amount);
        let category = resolver.resolve(&self.category_input);
        let (Some(amount), Some(date), Some(category)) = (amount, self.date, category) else {
            return Err(ServiceError::Validation(validate_expense(self, resolver)));
        };
        Ok(ExpenseInput {
            amount: format_amount(amount),
            currency: normalize_currency(&self.currency),
            description: self.description.trim().to_string(),
            transaction_date: date,
            category_id: category.id,
        })
    }
}

/// Email/password/full-name values of the auth forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Parse an amount typed with either `,` or `.` as decimal separator and
/// round it to cents. Returns `None` when unparsable.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replacen(',', ".", 1);
    // Decimal::from_str accepts digit separators like "1_000"
    if normalized.is_empty() || normalized.contains('_') {
        return None;
    }
    let value = Decimal::from_str(&normalized).ok()?;
    Some(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Render with exactly two fraction digits, e.g. `120.50`.
pub fn format_amount(amount: Decimal) -> String {
    let mut value = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value.to_string()
}

pub fn normalize_currency(raw: &str) -> String {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        code
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email.trim())
}

/// Validate the expense form. Every rule runs; none short-circuits.
pub fn validate_expense(form: &ExpenseForm, resolver: &CategoryResolver) -> FieldErrors {
    let mut errors = FieldErrors::default();

    // backend requires gt=0 with decimal_places=2, so compare after rounding to cents ("0.004" fails)
    match parse_amount(&form.amount) {
        Some(amount) if amount > Decimal::ZERO => {}
        _ => errors.insert(Field::Amount, AMOUNT_INVALID),
    }
    if form.description.trim().is_empty() {
        errors.insert(Field::Description, DESCRIPTION_MISSING);
    }
    if form.date.is_none() {
        errors.insert(Field::Date, DATE_MISSING);
    }
    if resolver.resolve(&form.category_input).is_none() {
        errors.insert(Field::Category, CATEGORY_UNKNOWN);
    }

    errors
}

/// Validate login (`registering == false`) or registration forms.
pub fn validate_auth(form: &AuthForm, registering: bool) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if !is_valid_email(&form.email) {
        errors.insert(Field::Email, EMAIL_INVALID);
    }
    if char_len(&form.password) < PASSWORD_MIN_CHARS {
        errors.insert(Field::Password, PASSWORD_TOO_SHORT);
    }
    if registering {
        let name = form.full_name.trim();
        if !name.is_empty() && char_len(name) < FULL_NAME_MIN_CHARS {
            errors.insert(Field::FullName, FULL_NAME_TOO_SHORT);
        }
    }

    errors
}

/// Which errors a form currently shows.
///
/// Errors appear for every field on submit, and for touched fields when one
/// of them loses focus. Editing a field hides its error until the next check.
#[derive(Debug, Clone, Default)]
pub struct FormFeedback {
    touched: BTreeSet<Field>,
    shown: FieldErrors,
}

impl FormFeedback {
    pub fn errors(&self) -> &FieldErrors {
        &self.shown
    }

    pub fn edit(&mut self, field: Field) {
        self.shown.remove(field);
    }

    /// `current` is the full validation result for the form as it stands.
    pub fn blur(&mut self, field: Field, mut current: FieldErrors) {
        self.touched.insert(field);
        current.retain_fields(&self.touched);
        self.shown = current;
    }

    /// Show everything; returns whether the form may be sent.
    pub fn submit(&mut self, current: FieldErrors) -> bool {
        self.touched.extend(current.fields());
        self.shown = current;
        self.shown.is_empty()
    }

    pub fn reset(&mut self) {
        self.touched.clear();
        self.shown = FieldErrors::default();
    }
}

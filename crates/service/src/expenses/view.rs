//! Presentation helpers for the expense list.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::pagination::PaginationState;
use crate::validation::normalize_currency;

const NBSP: char = '\u{a0}';

pub const EMPTY_LIST: &str = "Nenhuma despesa ainda.";
pub const NOTHING_LOADED: &str = "Nenhuma despesa carregada";

fn symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "BRL" => Some("R$"),
        "EUR" => Some("€"),
        "USD" => Some("US$"),
        _ => None,
    }
}

/// `1234.5` → `1.234,50`
fn group_pt_br(amount: Decimal) -> String {
    let mut value = amount.abs().round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    let text = value.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if amount.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

/// Render an amount string in pt-BR style, e.g. `R$ 120,50` (non-breaking
/// space). A blank currency means BRL and unknown ones use their code; a
/// non-numeric amount falls back to `"{currency} {amount}"`.
pub fn format_currency(amount: &str, currency: &str) -> String {
    let Ok(value) = Decimal::from_str(amount.trim()) else {
        return format!("{currency} {amount}");
    };
    let code = normalize_currency(currency);
    let prefix = symbol(&code).map(str::to_string).unwrap_or(code);
    format!("{prefix}{NBSP}{}", group_pt_br(value))
}

/// `Mostrando 51-55 de 55`, or the nothing-loaded text.
pub fn range_label(pagination: &PaginationState) -> String {
    match pagination.range() {
        (0, 0) => NOTHING_LOADED.to_string(),
        (start, end) => format!("Mostrando {start}-{end} de {}", pagination.total),
    }
}

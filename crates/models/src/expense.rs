use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Expense as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    /// Decimal rendered as a string, e.g. `"120.50"`.
    #[serde(deserialize_with = "amount_string")]
    pub amount: String,
    pub currency: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub category_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of `POST /expenses` and `PUT /expenses/{id}` (full replace).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseInput {
    pub amount: String,
    pub currency: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub category_id: i64,
}

/// `GET /expenses` response; only `items` is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExpensePage {
    #[serde(default)]
    pub items: Vec<Expense>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl ExpensePage {
    /// Reported total, or the number of items when the server omits it.
    pub fn total_items(&self) -> u64 {
        self.total.unwrap_or(self.items.len() as u64)
    }
}

// Some backends emit the amount as a JSON number.
fn amount_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_without_total_counts_items() {
        let page: ExpensePage = serde_json::from_str(
            r#"{"items":[{"id":"exp-1","amount":"90.00","currency":"BRL","description":"Mercado antigo","transaction_date":"2024-01-01","category_id":7}]}"#,
        )
        .unwrap();
        assert_eq!(page.total_items(), 1);
        assert_eq!(page.items[0].transaction_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(page.page, None);

        let empty: ExpensePage = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.total_items(), 0);
    }

    #[test]
    fn numeric_amount_is_accepted() {
        let e: Expense = serde_json::from_str(
            r#"{"id":"x","amount":12.5,"currency":"EUR","description":"d","transaction_date":"2024-02-03","category_id":1,"user_id":"u"}"#,
        )
        .unwrap();
        assert_eq!(e.amount, "12.5");
        assert_eq!(e.user_id.as_deref(), Some("u"));
    }
}

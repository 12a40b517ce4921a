use serde::{Deserialize, Serialize};

/// Icon given to categories the user created that match no default.
pub const GENERIC_ICON: &str = "🧩";

/// Id seed for stored categories that come without an id.
pub const SYNTHETIC_ID_SEED: i64 = 10_000;

/// Entry of the category autocomplete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: i64,
    pub label: String,
    pub icon: String,
    pub keywords: Vec<String>,
}

impl CategoryOption {
    pub fn new(id: i64, label: &str, icon: &str, keywords: &[&str]) -> Self {
        Self {
            id,
            label: label.to_string(),
            icon: icon.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Category as kept by the categories page under `spendario.categories`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCategory {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

impl StoredCategory {
    pub fn new(id: i64, name: &str, desc: &str) -> Self {
        Self { id, name: name.to_string(), desc: desc.to_string() }
    }
}

/// Built-in autocomplete options, in resolution order.
pub fn default_options() -> Vec<CategoryOption> {
    vec![
        CategoryOption::new(1, "Alimentação", "🍽️", &["mercado", "restaurante", "comida"]),
        CategoryOption::new(2, "Transporte", "🚌", &["uber", "combustível", "gasolina"]),
        CategoryOption::new(3, "Moradia", "🏠", &["aluguel", "condomínio", "contas"]),
        CategoryOption::new(4, "Saúde", "🩺", &["farmácia", "remédio", "consulta"]),
        CategoryOption::new(5, "Lazer", "🎉", &["cinema", "viagem", "passeio"]),
        CategoryOption::new(6, "Educação", "📚", &["curso", "livro", "faculdade"]),
        CategoryOption::new(7, "Supermercado", "🛒", &["compras", "mercado"]),
        CategoryOption::new(8, "Assinaturas", "💻", &["streaming", "software", "app"]),
        CategoryOption::new(9, "Serviços", "🛠️", &["manutenção", "prestação"]),
        CategoryOption::new(10, "Impostos", "💸", &["taxa", "iptu", "ipva"]),
        CategoryOption::new(11, "Investimentos", "📈", &["aplicação", "renda"]),
        CategoryOption::new(12, "Pets", "🐾", &["veterinário", "ração"]),
        CategoryOption::new(13, "Viagem", "✈️", &["hotel", "passagem"]),
        CategoryOption::new(14, "Presentes", "🎁", &["aniversário", "surpresa"]),
        CategoryOption::new(15, "Outros", "🧭", &["diversos", "extra"]),
    ]
}

/// Seed list shown on the categories page before the user saves anything.
pub fn default_stored() -> Vec<StoredCategory> {
    vec![
        StoredCategory::new(1, "Alimentação", "Supermercado, restaurantes e delivery."),
        StoredCategory::new(2, "Transporte", "Combustível, app de corridas, transporte público."),
        StoredCategory::new(3, "Moradia", "Aluguel, condomínio, luz, água, internet."),
        StoredCategory::new(4, "Assinaturas", "Streaming, apps, softwares."),
        StoredCategory::new(5, "Saúde", "Consultas, medicamentos, exames."),
        StoredCategory::new(6, "Lazer", "Viagens, cinema, shows."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids_are_unique_and_ordered() {
        let ids: Vec<i64> = default_options().iter().map(|o| o.id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn stored_category_tolerates_missing_fields() {
        let c: StoredCategory = serde_json::from_str(r#"{"name":"Pets"}"#).unwrap();
        assert_eq!(c, StoredCategory::new(0, "Pets", ""));
    }
}

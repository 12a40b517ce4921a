use std::collections::HashSet;

use common::utils::text::normalize;
use models::category::{default_options, CategoryOption, StoredCategory, GENERIC_ICON, SYNTHETIC_ID_SEED};
use tracing::debug;

use crate::storage::{keys, read_json, LocalStore};

/// Maps free text typed in the category field to one of a fixed list of
/// options. Matching is exact label, exact keyword, then label substring,
/// checked option by option; the first option that matches wins.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    options: Vec<CategoryOption>,
}

impl CategoryResolver {
    /// An empty list falls back to the defaults.
    pub fn new(options: Vec<CategoryOption>) -> Self {
        if options.is_empty() {
            return Self::defaults();
        }
        Self { options }
    }

    pub fn defaults() -> Self {
        Self { options: default_options() }
    }

    pub fn from_stored(stored: &[StoredCategory]) -> Self {
        Self::new(merge(stored))
    }

    /// Build from the persisted category list; absent or corrupt → defaults.
    pub async fn load(store: &dyn LocalStore) -> Self {
        match read_json::<Vec<StoredCategory>>(store, keys::CATEGORIES).await {
            Some(stored) => {
                let resolver = Self::from_stored(&stored);
                debug!(stored = stored.len(), options = resolver.options.len(), "category options merged");
                resolver
            }
            None => Self::defaults(),
        }
    }

    pub fn options(&self) -> &[CategoryOption] {
        &self.options
    }

    pub fn resolve(&self, input: &str) -> Option<&CategoryOption> {
        let needle = normalize(input);
        if needle.is_empty() {
            return None;
        }
        self.options.iter().find(|option| {
            let label = normalize(&option.label);
            label == needle
                || option.keywords.iter().any(|k| normalize(k) == needle)
                || label.contains(&needle)
        })
    }

    /// Label of the option with `id`, used to prefill edit forms.
    pub fn label_for(&self, id: i64) -> Option<&str> {
        self.options.iter().find(|o| o.id == id).map(|o| o.label.as_str())
    }
}

/// Merge the user's stored categories onto the defaults: a stored name that
/// matches a default label reuses that default, anything else becomes a
/// generic option keyed by its own name. Duplicates by normalized label keep
/// their first occurrence. An empty result falls back to the defaults.
pub fn merge(stored: &[StoredCategory]) -> Vec<CategoryOption> {
    let defaults = default_options();
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(stored.len());

    for (index, category) in stored.iter().enumerate() {
        let name = normalize(&category.name);
        let option = defaults
            .iter()
            .find(|d| normalize(&d.label) == name)
            .cloned()
            .unwrap_or_else(|| CategoryOption {
                id: if category.id != 0 { category.id } else { SYNTHETIC_ID_SEED + index as i64 },
                label: category.name.clone(),
                icon: GENERIC_ICON.to_string(),
                keywords: vec![name.clone()],
            });
        if seen.insert(normalize(&option.label)) {
            merged.push(option);
        }
    }

    if merged.is_empty() {
        return defaults;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLocalStore;

    #[test]
    fn exact_label_resolves_to_itself() {
        let r = CategoryResolver::defaults();
        for option in r.options() {
            assert_eq!(r.resolve(&option.label).map(|o| o.id), Some(option.id));
        }
        assert_eq!(r.resolve("  supermercado ").map(|o| o.id), Some(7));
    }

    #[test]
    fn keyword_and_substring_follow_list_order() {
        let r = CategoryResolver::defaults();
        // "mercado" is a keyword of Alimentação, which comes before Supermercado
        assert_eq!(r.resolve("mercado").map(|o| o.id), Some(1));
        assert_eq!(r.resolve("UBER").map(|o| o.id), Some(2));
        assert_eq!(r.resolve("invest").map(|o| o.id), Some(11));
        assert!(r.resolve("xyz").is_none());
    }

    #[test]
    fn blank_input_resolves_to_none() {
        let r = CategoryResolver::defaults();
        assert!(r.resolve("").is_none());
        assert!(r.resolve("   ").is_none());
    }

    #[test]
    fn merge_substitutes_defaults_and_synthesizes_others() {
        let stored = vec![
            StoredCategory::new(1, "alimentação", "x"),
            StoredCategory::new(7, "Academia", "gym"),
            StoredCategory::new(0, "Bar", ""),
            StoredCategory::new(9, "ACADEMIA", "dup"),
        ];
        let merged = merge(&stored);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].label, "Alimentação");
        assert_eq!(merged[0].icon, "🍽️");
        assert_eq!(merged[1], CategoryOption::new(7, "Academia", GENERIC_ICON, &["academia"]));
        assert_eq!(merged[2].id, SYNTHETIC_ID_SEED + 2);

        let r = CategoryResolver::new(merged);
        assert_eq!(r.label_for(7), Some("Academia"));
        assert_eq!(r.resolve("bar").map(|o| o.id), Some(SYNTHETIC_ID_SEED + 2));
    }

    #[test]
    fn empty_merge_falls_back_to_defaults() {
        assert_eq!(merge(&[]).len(), default_options().len());
    }

    #[tokio::test]
    async fn load_reads_persisted_list() {
        let store = MemoryLocalStore::new();
        assert_eq!(CategoryResolver::load(&*store).await.options().len(), 15);

        crate::storage::write_json(&*store, keys::CATEGORIES, &vec![StoredCategory::new(1, "Pets", "")])
            .await
            .unwrap();
        let r = CategoryResolver::load(&*store).await;
        assert_eq!(r.options().len(), 1);
        assert_eq!(r.options()[0].id, 12);

        store.set_item(keys::CATEGORIES, "not json".into()).await.unwrap();
        assert_eq!(CategoryResolver::load(&*store).await.options().len(), 15);
    }
}

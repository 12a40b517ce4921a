use std::sync::Arc;

use common::utils::text::char_len;
use models::category::{default_stored, StoredCategory};
use tracing::info;

use crate::categories::resolver::CategoryResolver;
use crate::errors::ServiceError;
use crate::storage::{keys, read_json, write_json, LocalStore};
use crate::validation::{Field, FieldErrors};

pub const NAME_MAX_CHARS: usize = 60;
pub const DESC_MAX_CHARS: usize = 100;

const MISSING_FIELDS: &str = "Preencha nome e descrição.";

/// The user's category list as kept under `spendario.categories`.
pub struct CategoryCatalog {
    store: Arc<dyn LocalStore>,
    categories: Vec<StoredCategory>,
}

impl CategoryCatalog {
    /// Load the persisted list, or the seed list when absent or corrupt.
    pub async fn load(store: Arc<dyn LocalStore>) -> Self {
        let categories = read_json::<Vec<StoredCategory>>(&*store, keys::CATEGORIES)
            .await
            .unwrap_or_else(default_stored);
        Self { store, categories }
    }

    pub fn list(&self) -> &[StoredCategory] {
        &self.categories
    }

    /// Append a category and persist the whole list.
    pub async fn create(&mut self, name: &str, desc: &str) -> Result<StoredCategory, ServiceError> {
        let name = name.trim();
        let desc = desc.trim();

        let mut errors = FieldErrors::default();
        if name.is_empty() {
            errors.insert(Field::Name, MISSING_FIELDS);
        } else if desc.is_empty() {
            errors.insert(Field::Description, MISSING_FIELDS);
        }
        if char_len(name) > NAME_MAX_CHARS {
            errors.insert(Field::Name, format!("Use no máximo {NAME_MAX_CHARS} caracteres."));
        }
        if char_len(desc) > DESC_MAX_CHARS {
            errors.insert(Field::Description, format!("Use no máximo {DESC_MAX_CHARS} caracteres."));
        }
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let id = self.categories.iter().map(|c| c.id).max().map_or(1, |max| max + 1);
        let category = StoredCategory::new(id, name, desc);
        self.categories.push(category.clone());
        write_json(&*self.store, keys::CATEGORIES, &self.categories).await?;
        info!(event = "category_created", id, name = %category.name, "category saved locally");
        Ok(category)
    }

    /// Autocomplete options for the expense forms, built from what is persisted.
    pub async fn resolver(&self) -> CategoryResolver {
        CategoryResolver::load(&*self.store).await
    }
}

//! Navigation of the authenticated area and the protected-route guard.

use common::types::Route;
use tracing::debug;

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
    pub badge: Option<&'static str>,
}

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem { label: "Dashboard", route: Route::Dashboard, badge: None },
    NavItem { label: "Despesas", route: Route::Expenses, badge: None },
    NavItem { label: "Categorias", route: Route::Categories, badge: None },
    NavItem { label: "Onboarding", route: Route::Onboarding, badge: Some("Novo") },
];

impl NavItem {
    /// Active on its own path and anything nested below it.
    pub fn is_active(&self, path: &str) -> bool {
        let href = self.route.path();
        path == href || path.strip_prefix(href).is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Each nav item paired with whether it is active for `path`.
pub fn active_map(path: &str) -> Vec<(NavItem, bool)> {
    NAV_ITEMS.iter().map(|item| (*item, item.is_active(path))).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Public page, no session needed.
    Public,
    /// Protected page with a stored token.
    Granted(String),
    Redirect(Route),
}

pub async fn guard(route: Route, sessions: &SessionStore) -> Access {
    if !route.is_protected() {
        return Access::Public;
    }
    match sessions.token().await {
        Some(token) => Access::Granted(token),
        None => {
            debug!(event = "guard_redirect", %route);
            Access::Redirect(Route::Login)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, LocalStore, MemoryLocalStore};

    #[test]
    fn nested_paths_keep_item_active() {
        let map = active_map("/expenses/42");
        let active: Vec<_> = map.iter().filter(|(_, on)| *on).map(|(i, _)| i.label).collect();
        assert_eq!(active, vec!["Despesas"]);
        assert!(!NAV_ITEMS[1].is_active("/expensesx"));
        assert_eq!(NAV_ITEMS[3].badge, Some("Novo"));
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() -> Result<(), anyhow::Error> {
        let store = MemoryLocalStore::new();
        let sessions = SessionStore::new(store.clone());
        assert_eq!(guard(Route::Login, &sessions).await, Access::Public);
        assert_eq!(guard(Route::Expenses, &sessions).await, Access::Redirect(Route::Login));

        store.set_item(keys::TOKEN, "tok".into()).await?;
        assert_eq!(guard(Route::Expenses, &sessions).await, Access::Granted("tok".into()));
        Ok(())
    }
}

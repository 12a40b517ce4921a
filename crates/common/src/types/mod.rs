use serde::{Deserialize, Serialize};

use crate::CommonError;

/// Pages of the application, addressed by their path.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    Expenses,
    Categories,
    Onboarding,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Expenses,
        Route::Categories,
        Route::Onboarding,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Expenses => "/expenses",
            Route::Categories => "/categories",
            Route::Onboarding => "/onboarding",
        }
    }

    /// Routes that require a stored session token.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard | Route::Expenses | Route::Categories | Route::Onboarding)
    }

    pub fn from_path(path: &str) -> Result<Self, CommonError> {
        Route::ALL
            .into_iter()
            .find(|r| r.path() == path)
            .ok_or_else(|| CommonError::UnknownRoute(path.to_string()))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

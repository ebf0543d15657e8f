//! Fixed mapping from console paths to views.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Products,
    Accounts,
    Permissions,
    Roles,
    Users,
}

impl Route {
    /// Protected routes in navigation order
    pub const PROTECTED: [Route; 5] = [
        Route::Products,
        Route::Accounts,
        Route::Permissions,
        Route::Roles,
        Route::Users,
    ];

    /// Resolve a path. Matching is by first segment, so `/product/P001`
    /// lands on Products; unknown paths fall back to the home view.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match segment {
            "login" => Route::Login,
            "account" => Route::Accounts,
            "permission" => Route::Permissions,
            "role" => Route::Roles,
            "user" => Route::Users,
            _ => Route::Products,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Products => "/product",
            Route::Accounts => "/account",
            Route::Permissions => "/permission",
            Route::Roles => "/role",
            Route::Users => "/user",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Products => "Products",
            Route::Accounts => "Accounts",
            Route::Permissions => "Permissions",
            Route::Roles => "Roles",
            Route::Users => "Users",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    fn position(&self) -> Option<usize> {
        Self::PROTECTED.iter().position(|r| r == self)
    }

    /// Next protected route (wrapping around)
    pub fn next(&self) -> Self {
        match self.position() {
            Some(i) => Self::PROTECTED[(i + 1) % Self::PROTECTED.len()],
            None => Route::Products,
        }
    }

    /// Previous protected route (wrapping around)
    pub fn prev(&self) -> Self {
        match self.position() {
            Some(i) => Self::PROTECTED[(i + Self::PROTECTED.len() - 1) % Self::PROTECTED.len()],
            None => Route::Products,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

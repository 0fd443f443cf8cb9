//! Views and the route guard in front of them.
//!
//! Protected views render only while the auth gate reports a valid session.
//! Anything else redirects to the login view; the requested destination is
//! dropped, so a successful login lands on the default view.

use std::fmt;

use tracing::debug;

use crate::auth::AuthGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Products,
    Settings,
}

impl View {
    pub const ALL: [View; 3] = [View::Login, View::Products, View::Settings];

    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Products => "/",
            View::Settings => "/settings",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(View::Products),
            "/login" => Some(View::Login),
            "/settings" => Some(View::Settings),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Products => "Products",
            View::Settings => "Settings",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, View::Login)
    }

    /// Where a successful login goes.
    pub fn landing() -> Self {
        View::Products
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    /// Session missing or expired; `to` is always the login view.
    Redirect { to: View },
}

impl Navigation {
    pub fn view(&self) -> View {
        match self {
            Navigation::Render(view) => *view,
            Navigation::Redirect { to } => *to,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

#[derive(Clone)]
pub struct RouteGuard {
    gate: AuthGate,
}

impl RouteGuard {
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Evaluate the gate for `requested`, at call time.
    pub fn navigate(&self, requested: View) -> Navigation {
        if !requested.is_protected() || self.gate.is_session_valid() {
            return Navigation::Render(requested);
        }
        debug!(requested = %requested, "Redirecting to login");
        Navigation::Redirect { to: View::Login }
    }

    pub fn navigate_path(&self, path: &str) -> Option<Navigation> {
        View::from_path(path).map(|view| self.navigate(view))
    }

    pub fn auth_state(&self) -> AuthState {
        if self.gate.is_session_valid() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }
}

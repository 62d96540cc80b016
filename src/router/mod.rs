//! Route table and authentication guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router only consumes the session: before entering a route it asks the
//! session store whether a token exists. Routes that declare
//! `requires_auth` send anonymous users to `/login`. The default table
//! declares none, so the guard stays dormant until a route opts in.
//!
//! Views are loaded lazily on first navigation and cached for the lifetime
//! of the router.

pub mod views;

use std::sync::OnceLock;

use crate::session::SessionStore;
pub use views::{View, ViewId};

pub const LOGIN_PATH: &str = "/login";
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("no route matches {0}")]
    NotFound(String),
    #[error("redirect loop while resolving {0}")]
    RedirectLoop(String),
}

// =============================================================================
// ROUTES
// =============================================================================

pub type ViewLoader = fn() -> View;

pub struct LazyView {
    loader: ViewLoader,
    loaded: OnceLock<View>,
}

impl LazyView {
    #[must_use]
    pub fn new(loader: ViewLoader) -> Self {
        Self { loader, loaded: OnceLock::new() }
    }

    pub fn get(&self) -> &View {
        self.loaded.get_or_init(|| {
            let view = (self.loader)();
            tracing::debug!(view = ?view.id, "view loaded");
            view
        })
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }
}

pub enum RouteTarget {
    Redirect(&'static str),
    View(LazyView),
}

pub struct Route {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub target: RouteTarget,
    pub requires_auth: bool,
}

impl Route {
    #[must_use]
    pub fn redirect(path: &'static str, to: &'static str) -> Self {
        Self { path, name: None, target: RouteTarget::Redirect(to), requires_auth: false }
    }

    #[must_use]
    pub fn view(path: &'static str, name: &'static str, loader: ViewLoader) -> Self {
        Self { path, name: Some(name), target: RouteTarget::View(LazyView::new(loader)), requires_auth: false }
    }

    #[must_use]
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Runs before every route is entered.
#[must_use]
pub fn guard(route: &Route, session: &SessionStore) -> GuardDecision {
    if route.requires_auth && !session.is_authenticated() {
        GuardDecision::Redirect(LOGIN_PATH)
    } else {
        GuardDecision::Proceed
    }
}

// =============================================================================
// ROUTER
// =============================================================================

#[derive(Debug)]
pub struct Navigation<'a> {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub view: &'a View,
    pub guard_redirected: bool,
}

pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(default_routes())
    }
}

impl Router {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Route> {
        let path = normalize_path(path);
        self.routes.iter().find(|r| r.path == path)
    }

    /// Resolve `path` to a view, following redirect entries and applying the
    /// guard at every hop.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown paths and `RedirectLoop` when redirects
    /// do not settle on a view.
    pub fn navigate(&self, path: &str, session: &SessionStore) -> Result<Navigation<'_>, RouteError> {
        let mut current = normalize_path(path).to_owned();
        let mut guard_redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            let route = self.find(&current).ok_or_else(|| RouteError::NotFound(current.clone()))?;

            if let GuardDecision::Redirect(to) = guard(route, session) {
                tracing::debug!(from = route.path, to, "auth guard redirect");
                current = to.to_owned();
                guard_redirected = true;
                continue;
            }

            match &route.target {
                RouteTarget::Redirect(to) => current = (*to).to_owned(),
                RouteTarget::View(view) => {
                    return Ok(Navigation { path: route.path, name: route.name, view: view.get(), guard_redirected });
                }
            }
        }

        Err(RouteError::RedirectLoop(path.to_owned()))
    }
}

/// Drop query and fragment, and any trailing slash except on the root.
fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// `/` → `/login`, then the login, register and candidate landing views.
#[must_use]
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::redirect("/", LOGIN_PATH),
        Route::view(LOGIN_PATH, "login", views::login),
        Route::view("/register", "register", views::register),
        Route::view("/home", "home", views::candidate_applications),
    ]
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

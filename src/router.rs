//! Route table, navigation guard and the in-process router.
//!
//! SYSTEM CONTEXT
//! ==============
//! The [`Router`] owns the current location. Every transition runs through
//! the [`NavigationGuard`], which reads the [`SessionStore`] and substitutes
//! the login route for protected targets when nobody is signed in. The HTTP
//! client only sees the router through the [`Navigator`] capability, so it can
//! be exercised without one.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::form_urlencoded;

use crate::session::{Session, SessionStore};

pub const LOGIN_PATH: &str = "/login";
pub const RETURN_URL_KEY: &str = "returnUrl";
pub const TITLE_PREFIX: &str = "优医问诊";

// =============================================================================
// LOCATION
// =============================================================================

/// A navigation target: path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), query: Vec::new() }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Parse a full path such as `/user?tab=1`.
    #[must_use]
    pub fn parse(full_path: &str) -> Self {
        match full_path.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_owned(),
                query: form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
            },
            None => Self::new(full_path),
        }
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Path followed by the encoded query, if any.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.query).finish();
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// The login route carrying the path to resume after signing in.
#[must_use]
pub fn login_redirect(return_url: &str) -> Location {
    Location::new(LOGIN_PATH).with_query(RETURN_URL_KEY, return_url)
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRecord {
    pub path: &'static str,
    pub title: &'static str,
    pub redirect: Option<&'static str>,
}

pub const ROUTES: &[RouteRecord] = &[
    RouteRecord { path: LOGIN_PATH, title: "登录", redirect: None },
    RouteRecord { path: "/", title: "", redirect: Some("/home") },
    RouteRecord { path: "/home", title: "首页", redirect: None },
    RouteRecord { path: "/article", title: "健康百科", redirect: None },
    RouteRecord { path: "/notify", title: "消息通知", redirect: None },
    RouteRecord { path: "/user", title: "个人中心", redirect: None },
];

fn find_route(path: &str) -> Option<&'static RouteRecord> {
    ROUTES.iter().find(|r| r.path == path)
}

/// Document title for a route, set after each committed navigation.
#[must_use]
pub fn page_title(route_title: &str) -> String {
    format!("{TITLE_PREFIX}-{route_title}")
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Location),
}

/// Gate consulted before every route transition. Pure: no side effects.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    allow_list: Vec<String>,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self { allow_list: vec![LOGIN_PATH.to_owned()] }
    }
}

impl NavigationGuard {
    /// Guard with extra anonymous routes. The login route is always allowed.
    #[must_use]
    pub fn with_allowed<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = Self::default();
        for path in paths {
            let path = path.into();
            if !guard.allow_list.contains(&path) {
                guard.allow_list.push(path);
            }
        }
        guard
    }

    #[must_use]
    pub fn is_allowed_anonymously(&self, path: &str) -> bool {
        self.allow_list.iter().any(|p| p == path)
    }

    #[must_use]
    pub fn check(&self, to: &Location, session: Option<&Session>) -> GuardOutcome {
        if self.is_allowed_anonymously(&to.path) {
            return GuardOutcome::Allow;
        }
        if session.is_some_and(Session::has_token) {
            GuardOutcome::Allow
        } else {
            GuardOutcome::Redirect(login_redirect(&to.full_path()))
        }
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Navigation capability handed to the HTTP client.
pub trait Navigator: Send + Sync {
    /// Full path of the route active right now.
    fn current_full_path(&self) -> String;

    /// Request a transition. Returns `false` when nothing changed.
    fn push(&self, to: Location) -> bool;
}

/// Result of [`Router::navigate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Committed(Location),
    Redirected { requested: Location, to: Location },
    /// Target resolved to the location already active.
    Unchanged,
    NotFound(String),
}

impl Navigation {
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Committed(_) | Self::Redirected { .. })
    }
}

#[derive(Debug)]
struct RouterState {
    current: Location,
    title: String,
}

/// In-process router over [`ROUTES`].
pub struct Router {
    guard: NavigationGuard,
    session: Arc<SessionStore>,
    state: Mutex<RouterState>,
}

impl Router {
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self::with_guard(session, NavigationGuard::default())
    }

    #[must_use]
    pub fn with_guard(session: Arc<SessionStore>, guard: NavigationGuard) -> Self {
        Self {
            guard,
            session,
            state: Mutex::new(RouterState { current: Location::new("/"), title: String::new() }),
        }
    }

    #[must_use]
    pub fn current(&self) -> Location {
        self.lock().current.clone()
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    /// Resolve, guard and commit a transition.
    pub fn navigate(&self, to: Location) -> Navigation {
        let requested = match find_route(&to.path) {
            Some(RouteRecord { redirect: Some(target), .. }) => Location::new(*target),
            Some(_) => to,
            None => {
                tracing::warn!(path = %to.path, "no route matches navigation target");
                return Navigation::NotFound(to.path);
            }
        };

        let session = self.session.get();
        let target = match self.guard.check(&requested, session.as_ref()) {
            GuardOutcome::Allow => requested.clone(),
            GuardOutcome::Redirect(login) => login,
        };

        let mut state = self.lock();
        if state.current == target {
            return Navigation::Unchanged;
        }
        let route_title = find_route(&target.path).map_or("", |r| r.title);
        state.current = target.clone();
        state.title = page_title(route_title);
        tracing::debug!(to = %target, title = %state.title, "navigation committed");
        drop(state);

        if target == requested {
            Navigation::Committed(target)
        } else {
            Navigation::Redirected { requested, to: target }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for Router {
    fn current_full_path(&self) -> String {
        self.lock().current.full_path()
    }

    fn push(&self, to: Location) -> bool {
        self.navigate(to).changed()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("current", &self.current()).finish_non_exhaustive()
    }
}

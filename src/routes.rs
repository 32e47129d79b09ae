//! Navigable surfaces and the access guard.
//!
//! Routes mirror the hosted client: landing, per-shop upload, login, and
//! the owner dashboard. Unknown paths resolve to the landing route. The
//! guard is a pure function of the controller's state: it renders nothing
//! guarded while the startup check is still in flight, and otherwise
//! allows, or redirects carrying the originally requested location.

use std::fmt;

/// A navigable location. Parsed from a path or a full pasted link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Shop(String),
    Login,
    Dashboard,
}

/// Access requirement of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    RequiresAuth,
    AnonymousOnly,
}

/// What the guard decided for a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup validation still in flight: show a blocking indicator,
    /// render no guarded content, make no redirect decision yet.
    Wait,
    Allow,
    /// Not signed in; go to the login entry point and come back here after.
    RedirectToLogin { from: Route },
    /// Already signed in; anonymous-only surfaces bounce to the dashboard.
    RedirectToDashboard,
}

impl Route {
    /// Resolve a path or full link to a route. Anything unrecognized lands
    /// on the landing route, matching the client's catch-all redirect.
    pub fn parse(input: &str) -> Self {
        let path = match input.split_once("://") {
            // Strip scheme and authority from a pasted link.
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
            None => input,
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Landing,
            ["shop", code] if !code.is_empty() => Self::Shop((*code).to_string()),
            ["login"] => Self::Login,
            ["dashboard"] => Self::Dashboard,
            _ => Self::Landing,
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Self::Landing | Self::Shop(_) => Access::Public,
            Self::Login => Access::AnonymousOnly,
            Self::Dashboard => Access::RequiresAuth,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Shop(code) => format!("/shop/{code}"),
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The guard itself. Holds no state; both inputs come from the auth
/// lifecycle controller at the moment of the navigation attempt.
pub fn evaluate(route: &Route, loading: bool, authenticated: bool) -> GuardDecision {
    match route.access() {
        Access::Public => GuardDecision::Allow,
        Access::RequiresAuth if loading => GuardDecision::Wait,
        Access::RequiresAuth if !authenticated => GuardDecision::RedirectToLogin {
            from: route.clone(),
        },
        Access::RequiresAuth => GuardDecision::Allow,
        Access::AnonymousOnly if loading => GuardDecision::Wait,
        Access::AnonymousOnly if authenticated => GuardDecision::RedirectToDashboard,
        Access::AnonymousOnly => GuardDecision::Allow,
    }
}

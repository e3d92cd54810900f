//! Router and guard
//!
//! [`resolve`] is a pure function of the session state and the requested
//! route. [`Navigator`] only remembers where the user is.

use std::fmt;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::client::gateway::UnauthorizedHandler;
use crate::client::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    NewEvent,
    EditEvent(Uuid),
}

impl Route {
    /// Parse a location; unknown paths are `None`
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["dashboard"] => Some(Self::Dashboard),
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["events", "new"] => Some(Self::NewEvent),
            ["events", id, "edit"] => Uuid::parse_str(id).ok().map(Self::EditEvent),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::NewEvent => "/events/new".to_string(),
            Self::EditEvent(id) => format!("/events/{}/edit", id),
        }
    }

    /// Only reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What to show for a requested route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
    /// Session not resolved yet
    Placeholder,
}

pub fn resolve(state: &SessionState, requested: Route) -> Navigation {
    match state {
        SessionState::Uninitialized | SessionState::Loading => Navigation::Placeholder,
        SessionState::Ready(None) if requested.is_public() => Navigation::Render(requested),
        SessionState::Ready(None) => Navigation::Redirect(Route::Login),
        SessionState::Ready(Some(_)) if requested.is_public() => {
            Navigation::Redirect(Route::Dashboard)
        }
        SessionState::Ready(Some(_)) => Navigation::Render(requested),
    }
}

/// Current navigation location, shared with the gateway's 401 handler
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Arc<Mutex<Route>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    pub fn current(&self) -> Route {
        self.current
            .lock()
            .map(|route| *route)
            .unwrap_or(Route::Login)
    }

    pub fn navigate(&self, route: Route) {
        if let Ok(mut current) = self.current.lock() {
            tracing::debug!("Navigate {} -> {}", *current, route);
            *current = route;
        }
    }

    pub fn force_login(&self) {
        tracing::info!("Redirecting to {}", Route::Login);
        self.navigate(Route::Login);
    }

    /// Handler to install on the gateway
    pub fn unauthorized_handler(&self) -> UnauthorizedHandler {
        let navigator = self.clone();
        Arc::new(move || navigator.force_login())
    }

    /// Apply the guard to the current location, following redirects
    pub fn resolve(&self, state: &SessionState) -> Navigation {
        let navigation = resolve(state, self.current());
        if let Navigation::Redirect(target) = navigation {
            self.navigate(target);
        }
        navigation
    }
}

//! Screen tree and route guards.
//!
//! DESIGN
//! ======
//! Guards are pure functions of a [`Session`] snapshot. They never render
//! anything themselves; they return a [`GuardOutcome`] telling the front end
//! whether to show the screen, a loading placeholder, or go elsewhere.
//! Insufficient role is a silent redirect to the dashboard.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::role::Role;
use crate::state::auth::Session;

/// Every screen of the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Audios,
    Sermons,
    Events,
    Posts,
    Live,
    Profile,
    Users,
    Donations,
    NotFound,
}

impl Route {
    /// Screens listed in the navigation menu, in display order.
    pub const MENU: [Route; 8] = [
        Route::Dashboard,
        Route::Audios,
        Route::Sermons,
        Route::Events,
        Route::Posts,
        Route::Live,
        Route::Users,
        Route::Donations,
    ];

    /// Landing screen after sign-in and target of role redirects.
    pub const LANDING: Route = Route::Dashboard;

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Audios => "/audios",
            Self::Sermons => "/sermons",
            Self::Events => "/events",
            Self::Posts => "/posts",
            Self::Live => "/live",
            Self::Profile => "/profile",
            Self::Users => "/users",
            Self::Donations => "/donations",
            Self::NotFound => "/404",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Audios => "Audios",
            Self::Sermons => "Sermons",
            Self::Events => "Events",
            Self::Posts => "Posts",
            Self::Live => "Live",
            Self::Profile => "Profile",
            Self::Users => "Users",
            Self::Donations => "Donations",
            Self::NotFound => "Not found",
        }
    }

    /// Map a path to its screen. `/` is handled by [`resolve`].
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed {
            "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            "/audios" => Self::Audios,
            "/sermons" => Self::Sermons,
            "/events" => Self::Events,
            "/posts" => Self::Posts,
            "/live" => Self::Live,
            "/profile" => Self::Profile,
            "/users" => Self::Users,
            "/donations" => Self::Donations,
            _ => Self::NotFound,
        }
    }

    /// How the screen is protected.
    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Self::Login => Access::Public,
            Self::NotFound => Access::Open,
            Self::Users | Self::Donations => Access::Protected(Some(Role::Admin)),
            Self::Dashboard
            | Self::Audios
            | Self::Sermons
            | Self::Events
            | Self::Posts
            | Self::Live
            | Self::Profile => Access::Protected(None),
        }
    }

    /// Lowest role that sees this screen in the navigation menu.
    #[must_use]
    pub fn menu_role(self) -> Role {
        match self {
            Self::Users | Self::Donations => Role::Admin,
            _ => Role::Media,
        }
    }
}

/// Guard applied to a screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Only for signed-out visitors (sign-in form).
    Public,
    /// Requires a session, optionally with a minimum role.
    Protected(Option<Role>),
    /// Always rendered.
    Open,
}

/// What the front end should do with a navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    Loading,
    Redirect(Route),
}

/// Protected-route wrapper.
#[must_use]
pub fn guard_protected(session: &Session, required: Option<Role>) -> GuardOutcome {
    if session.loading {
        return GuardOutcome::Loading;
    }
    if !session.is_authenticated {
        return GuardOutcome::Redirect(Route::Login);
    }
    match required {
        Some(role) if !session.has_permission(role) => GuardOutcome::Redirect(Route::LANDING),
        _ => GuardOutcome::Render,
    }
}

/// Public-route wrapper.
#[must_use]
pub fn guard_public(session: &Session) -> GuardOutcome {
    if session.loading {
        GuardOutcome::Loading
    } else if session.is_authenticated {
        GuardOutcome::Redirect(Route::LANDING)
    } else {
        GuardOutcome::Render
    }
}

/// Apply the guard for `route`.
#[must_use]
pub fn guard(route: Route, session: &Session) -> GuardOutcome {
    match route.access() {
        Access::Public => guard_public(session),
        Access::Protected(required) => guard_protected(session, required),
        Access::Open => GuardOutcome::Render,
    }
}

/// Resolve a path into the screen to show and the guard decision for it.
///
/// `/` always redirects to the landing screen, which is guarded in turn.
#[must_use]
pub fn resolve(path: &str, session: &Session) -> (Route, GuardOutcome) {
    if path.trim_end_matches('/').is_empty() {
        return (Route::LANDING, GuardOutcome::Redirect(Route::LANDING));
    }
    let route = Route::from_path(path);
    (route, guard(route, session))
}

/// Menu entries visible to the signed-in user.
#[must_use]
pub fn navigation(session: &Session) -> Vec<Route> {
    Route::MENU
        .into_iter()
        .filter(|route| guard(*route, session) == GuardOutcome::Render && session.has_permission(route.menu_role()))
        .collect()
}

/// Receiver of navigations the console forces on the user, such as the
/// return to the login screen after an unrecoverable 401.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<F> Navigator for F
where
    F: Fn(Route) + Send + Sync,
{
    fn navigate(&self, route: Route) {
        self(route);
    }
}

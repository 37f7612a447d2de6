use serde::Serialize;

use super::permissions::permits;
use super::session::{SessionEnd, SessionState, SessionStore};
use crate::types::{Action, Resource, Role};

/// Anonymous landing page
pub const LANDING_ROUTE: &str = "/";
/// Login entry point
pub const LOGIN_ROUTE: &str = "/login";
/// Default landing for signed-in users
pub const DASHBOARD_ROUTE: &str = "/app/dashboard";

/// What a protected operation needs from the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    pub roles: Vec<Role>,
    pub permission: Option<(Resource, Action)>,
}

impl Requirement {
    /// Any signed-in user
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn permission(resource: Resource, action: Action) -> Self {
        Self {
            roles: Vec::new(),
            permission: Some((resource, action)),
        }
    }

    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            permission: None,
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Identity still resolving; suspend instead of deciding
    Pending,
    Allow,
    /// Signed in but not entitled: back to the dashboard
    DenyRedirect,
    /// Not signed in: to the login page
    DenyUnauthenticated,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Where the navigation layer should go instead, if anywhere
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Decision::Pending | Decision::Allow => None,
            Decision::DenyRedirect => Some(DASHBOARD_ROUTE),
            Decision::DenyUnauthenticated => Some(LOGIN_ROUTE),
        }
    }
}

/// Decide whether `state` satisfies `requirement`.
///
/// Authentication is settled before any role or permission check, so an
/// anonymous session is always `DenyUnauthenticated`.
pub fn check(state: &SessionState, requirement: &Requirement) -> Decision {
    let identity = match state {
        SessionState::Loading => return Decision::Pending,
        SessionState::Anonymous => return Decision::DenyUnauthenticated,
        SessionState::Authenticated(identity) => identity,
    };

    let role = identity.role;

    if !requirement.roles.is_empty() && !role.is_admin() && !requirement.roles.contains(&role) {
        return Decision::DenyRedirect;
    }

    if let Some((resource, action)) = requirement.permission {
        if !permits(role, resource, action) {
            return Decision::DenyRedirect;
        }
    }

    Decision::Allow
}

/// Where to go after a session ends
pub fn route_after(end: SessionEnd) -> &'static str {
    match end {
        SessionEnd::LoggedOut => LANDING_ROUTE,
        SessionEnd::Expired => LOGIN_ROUTE,
    }
}

/// Guard bound to a live session; each check reads the current state
#[derive(Debug, Clone)]
pub struct AccessGuard {
    session: SessionStore,
}

impl AccessGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn check(&self, requirement: &Requirement) -> Decision {
        let decision = check(&self.session.current_state(), requirement);
        tracing::debug!(?requirement, ?decision, "Access check");
        decision
    }
}

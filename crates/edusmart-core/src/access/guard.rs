//! Route guard.
//!
//! A pure function of the session phase and a static route table. The guard
//! never retries; it is re-evaluated whenever the session phase changes.

use crate::session::{Role, SessionPhase};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const HOME_PATH: &str = "/";

/// Who may open a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No session needed (login page).
    Public,
    /// Any signed-in user.
    Authenticated,
    /// Signed-in users whose role is in the list.
    Roles(Vec<Role>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pattern: String,
    access: Access,
}

impl RouteRule {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    /// Segment-wise match; `:name` segments match any single segment.
    fn matches(&self, path: &str) -> bool {
        let mut pattern = segments(&self.pattern);
        let mut actual = segments(path);
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return true,
                (Some(p), Some(a)) if p.starts_with(':') || p == a => continue,
                _ => return false,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Strips query string and fragment from a location.
fn path_of(location: &str) -> &str {
    location
        .split(['?', '#'])
        .next()
        .unwrap_or(location)
}

/// Static route configuration.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: impl Into<String>, access: Access) -> Self {
        self.rules.push(RouteRule {
            pattern: pattern.into(),
            access,
        });
        self
    }

    /// Registers several patterns sharing one allow-list.
    pub fn group(mut self, patterns: &[&str], roles: &[Role]) -> Self {
        for pattern in patterns {
            self = self.route(*pattern, Access::Roles(roles.to_vec()));
        }
        self
    }

    /// The dashboard's route table.
    pub fn standard() -> Self {
        use Role::*;
        Self::new()
            .route(LOGIN_PATH, Access::Public)
            .route(HOME_PATH, Access::Authenticated)
            .route(UNAUTHORIZED_PATH, Access::Authenticated)
            .group(&["/routine"], &[Teacher, ClassTeacher, SuperAdmin])
            .group(
                &[
                    "/students",
                    "/students/register",
                    "/students/profile/:studentId",
                    "/students/edit/:id",
                    "/exams/generate-results",
                    "/settings/routine-setup",
                ],
                &[SuperAdmin, Admin],
            )
            .group(
                &["/finance/collect", "/finance/defaulters"],
                &[SuperAdmin, Accountant],
            )
            .group(
                &["/attendance", "/exams/marks-entry", "/exams/report-cards"],
                &[Teacher, ClassTeacher, SuperAdmin, Admin],
            )
            .group(
                &[
                    "/settings",
                    "/settings/users",
                    "/settings/teachers",
                    "/settings/branding",
                    "/settings/fees",
                    "/settings/years",
                    "/settings/structure",
                ],
                &[SuperAdmin],
            )
    }

    /// Finds the rule for a location; literal segments take priority over
    /// `:param` segments.
    pub fn resolve(&self, location: &str) -> Option<&RouteRule> {
        let path = path_of(location);
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| segments(&rule.pattern).filter(|s| !s.starts_with(':')).count())
    }
}

/// Guard outcome for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session resolution still in flight; render a placeholder.
    Checking,
    /// Render the requested view.
    Allow,
    /// Send to the login page, remembering where the user wanted to go.
    RedirectToLogin { from: String },
    /// Signed in, but the role is not in the route's allow-list.
    RedirectToUnauthorized,
    /// Unknown location (catch-all redirect).
    Redirect(String),
}

impl GuardDecision {
    /// Where the navigation should end up, if it is a redirect.
    pub fn target(&self) -> Option<&str> {
        match self {
            GuardDecision::RedirectToLogin { .. } => Some(LOGIN_PATH),
            GuardDecision::RedirectToUnauthorized => Some(UNAUTHORIZED_PATH),
            GuardDecision::Redirect(path) => Some(path),
            GuardDecision::Checking | GuardDecision::Allow => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn check(&self, phase: &SessionPhase, location: &str) -> GuardDecision {
        let Some(rule) = self.table.resolve(location) else {
            return GuardDecision::Redirect(HOME_PATH.to_string());
        };

        if rule.access == Access::Public {
            return GuardDecision::Allow;
        }

        match phase {
            SessionPhase::Checking => GuardDecision::Checking,
            SessionPhase::SignedOut => GuardDecision::RedirectToLogin {
                from: location.to_string(),
            },
            SessionPhase::SignedIn(session) => match &rule.access {
                Access::Roles(roles) if !roles.contains(&session.role) => {
                    GuardDecision::RedirectToUnauthorized
                }
                _ => GuardDecision::Allow,
            },
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(RouteTable::standard())
    }
}

/// Where to go after a successful login.
///
/// Returns the remembered location, or home when there is none (or when the
/// remembered location is the login page itself).
pub fn login_return_target(from: Option<&str>) -> String {
    match from {
        Some(location) if path_of(location) != LOGIN_PATH && !location.is_empty() => {
            location.to_string()
        }
        _ => HOME_PATH.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn signed_in(role: Role) -> SessionPhase {
        SessionPhase::SignedIn(Session {
            id: "u1".into(),
            name: "Test".into(),
            email: None,
            role,
            token: "t".into(),
            campuses: vec![],
        })
    }

    #[test]
    fn test_checking_while_session_resolves() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.check(&SessionPhase::Checking, "/students"),
            GuardDecision::Checking
        );
    }

    #[test]
    fn test_unauthenticated_redirect_remembers_location() {
        let guard = RouteGuard::default();
        let decision = guard.check(&SessionPhase::SignedOut, "/finance/collect?student=42");
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                from: "/finance/collect?student=42".into()
            }
        );
        assert_eq!(decision.target(), Some(LOGIN_PATH));
    }

    #[test]
    fn test_role_outside_allow_list_is_denied() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.check(&signed_in(Role::Teacher), "/finance/collect"),
            GuardDecision::RedirectToUnauthorized
        );
        assert_eq!(
            guard.check(&signed_in(Role::Accountant), "/finance/collect"),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_param_segments_match() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.check(&signed_in(Role::Admin), "/students/profile/STU-0042"),
            GuardDecision::Allow
        );
        assert_eq!(
            guard.check(&signed_in(Role::Accountant), "/students/edit/abc"),
            GuardDecision::RedirectToUnauthorized
        );
    }

    #[test]
    fn test_super_admin_settings() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.check(&signed_in(Role::SuperAdmin), "/settings/years"),
            GuardDecision::Allow
        );
        assert_eq!(
            guard.check(&signed_in(Role::Admin), "/settings/years"),
            GuardDecision::RedirectToUnauthorized
        );
    }

    #[test]
    fn test_any_authenticated_role_reaches_home() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.check(&signed_in(Role::Other("LIBRARIAN".into())), "/"),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_login_is_public() {
        let guard = RouteGuard::default();
        assert_eq!(guard.check(&SessionPhase::Checking, "/login"), GuardDecision::Allow);
    }

    #[test]
    fn test_unknown_location_redirects_home() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.check(&signed_in(Role::Admin), "/nowhere"),
            GuardDecision::Redirect("/".into())
        );
    }

    #[test]
    fn test_login_return_target() {
        assert_eq!(login_return_target(Some("/attendance")), "/attendance");
        assert_eq!(login_return_target(Some("/login")), "/");
        assert_eq!(login_return_target(None), "/");
    }
}

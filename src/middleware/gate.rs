//! The authorization decision.
//!
//! [`AuthorizationGate::decide`] is a pure function of the request context and
//! the route classification. Rules are evaluated in a fixed order and the first
//! one that produces a decision wins; a request no rule objects to is allowed.

use warden_config::RouteConfig;
use warden_core::{RequestContext, RouteMatch};

pub const BAN_MESSAGE: &str = "Account has been banned";

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
    /// Destroy the user's sessions, then redirect.
    EnforceBanThenRedirect(String),
}

impl Decision {
    /// Label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Redirect(_) => "redirect",
            Decision::EnforceBanThenRedirect(_) => "ban",
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Redirect(location) | Decision::EnforceBanThenRedirect(location) => {
                Some(location)
            }
        }
    }
}

type Rule = fn(&AuthorizationGate, &RequestContext, &str, &RouteMatch) -> Option<Decision>;

/// Order matters: a banned user never reaches the admin check, and the admin
/// check runs before the protected ones so `/admin/*` sends anonymous users home.
const RULES: [Rule; 5] = [
    banned,
    admin_only,
    protected,
    protected_with_return,
    anonymous_only,
];

fn banned(
    gate: &AuthorizationGate,
    ctx: &RequestContext,
    _path: &str,
    _route: &RouteMatch,
) -> Option<Decision> {
    ctx.roles.is_banned().then(|| {
        Decision::EnforceBanThenRedirect(format!(
            "{}?error={}",
            gate.login_path,
            urlencoding::encode(&gate.ban_message)
        ))
    })
}

fn admin_only(
    gate: &AuthorizationGate,
    ctx: &RequestContext,
    _path: &str,
    route: &RouteMatch,
) -> Option<Decision> {
    (route.admin && !ctx.roles.is_admin()).then(|| Decision::Redirect(gate.home_path.clone()))
}

fn protected(
    gate: &AuthorizationGate,
    ctx: &RequestContext,
    _path: &str,
    route: &RouteMatch,
) -> Option<Decision> {
    (route.protected && !ctx.is_authenticated())
        .then(|| Decision::Redirect(gate.login_path.clone()))
}

fn protected_with_return(
    gate: &AuthorizationGate,
    ctx: &RequestContext,
    path: &str,
    route: &RouteMatch,
) -> Option<Decision> {
    (route.protected_redirect && !ctx.is_authenticated()).then(|| {
        Decision::Redirect(format!(
            "{}?redirect={}",
            gate.login_path,
            urlencoding::encode(path)
        ))
    })
}

fn anonymous_only(
    gate: &AuthorizationGate,
    ctx: &RequestContext,
    _path: &str,
    route: &RouteMatch,
) -> Option<Decision> {
    (route.redirect && ctx.is_authenticated()).then(|| Decision::Redirect(gate.home_path.clone()))
}

#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    login_path: String,
    home_path: String,
    ban_message: String,
}

impl AuthorizationGate {
    pub fn new(login_path: impl Into<String>, home_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            home_path: home_path.into(),
            ban_message: BAN_MESSAGE.to_string(),
        }
    }

    pub fn from_config(config: &RouteConfig) -> Self {
        Self::new(config.login_path.clone(), config.home_path.clone())
    }

    pub fn with_ban_message(mut self, message: impl Into<String>) -> Self {
        self.ban_message = message.into();
        self
    }

    pub fn decide(&self, ctx: &RequestContext, path: &str, route: &RouteMatch) -> Decision {
        if route.bypass {
            return Decision::Allow;
        }

        RULES
            .iter()
            .find_map(|rule| rule(self, ctx, path, route))
            .unwrap_or(Decision::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Identity, RoleSet, RoleSnapshot};

    fn gate() -> AuthorizationGate {
        AuthorizationGate::new("/login", "/")
    }

    fn user(roles: &[&str]) -> RequestContext {
        RequestContext::authenticated(
            Identity::new("u-1", "ada@example.com", "Ada"),
            RoleSnapshot::new(RoleSet::for_identity(roles.iter().copied()), 3),
        )
    }

    fn route(f: impl FnOnce(&mut RouteMatch)) -> RouteMatch {
        let mut route = RouteMatch::default();
        f(&mut route);
        route
    }

    #[test]
    fn test_unclassified_path_is_allowed() {
        let decision = gate().decide(&RequestContext::anonymous(), "/about", &RouteMatch::default());
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_bypass_allows_even_banned_users() {
        let bypass = route(|r| {
            r.bypass = true;
            r.admin = true;
        });
        assert_eq!(gate().decide(&user(&["banned"]), "/feed.xml", &bypass), Decision::Allow);
    }

    #[test]
    fn test_banned_user_is_sent_to_login_with_error() {
        let decision = gate().decide(&user(&["banned"]), "/", &RouteMatch::default());
        assert_eq!(
            decision,
            Decision::EnforceBanThenRedirect("/login?error=Account%20has%20been%20banned".into())
        );
    }

    #[test]
    fn test_ban_wins_over_admin_role() {
        let admin = route(|r| r.admin = true);
        let decision = gate().decide(&user(&["admin", "banned"]), "/admin/settings", &admin);
        assert_eq!(decision.as_str(), "ban");
    }

    #[test]
    fn test_admin_route_without_admin_role_goes_home() {
        let admin = route(|r| r.admin = true);
        assert_eq!(
            gate().decide(&RequestContext::anonymous(), "/admin/settings", &admin),
            Decision::Redirect("/".into())
        );
        assert_eq!(
            gate().decide(&user(&[]), "/admin/settings", &admin),
            Decision::Redirect("/".into())
        );
        assert_eq!(
            gate().decide(&user(&["admin"]), "/admin/settings", &admin),
            Decision::Allow
        );
    }

    #[test]
    fn test_admin_rule_precedes_protected_rule() {
        let both = route(|r| {
            r.admin = true;
            r.protected = true;
        });
        assert_eq!(
            gate().decide(&RequestContext::anonymous(), "/admin", &both),
            Decision::Redirect("/".into())
        );
        assert_eq!(gate().decide(&user(&["admin"]), "/admin", &both), Decision::Allow);
    }

    #[test]
    fn test_protected_route_requires_session() {
        let protected = route(|r| r.protected = true);
        assert_eq!(
            gate().decide(&RequestContext::anonymous(), "/api/me", &protected),
            Decision::Redirect("/login".into())
        );
        assert_eq!(gate().decide(&user(&[]), "/api/me", &protected), Decision::Allow);
    }

    #[test]
    fn test_protected_redirect_encodes_return_path() {
        let protected = route(|r| r.protected_redirect = true);
        let decision = gate().decide(&RequestContext::anonymous(), "/dashboard/a b", &protected);
        assert_eq!(
            decision.location(),
            Some("/login?redirect=%2Fdashboard%2Fa%20b")
        );
    }

    #[test]
    fn test_protected_redirect_is_idempotent() {
        let protected = route(|r| r.protected_redirect = true);
        let anonymous = RequestContext::anonymous();
        let first = gate().decide(&anonymous, "/dashboard", &protected);
        let second = gate().decide(&anonymous, "/dashboard", &protected);
        assert_eq!(first, second);
        assert_eq!(first.location(), Some("/login?redirect=%2Fdashboard"));
    }

    #[test]
    fn test_signed_in_users_leave_login_page() {
        let redirect = route(|r| r.redirect = true);
        assert_eq!(gate().decide(&user(&[]), "/login", &redirect), Decision::Redirect("/".into()));
        assert_eq!(
            gate().decide(&RequestContext::anonymous(), "/login", &redirect),
            Decision::Allow
        );
    }

    #[test]
    fn test_custom_paths_and_message() {
        let gate = AuthorizationGate::new("/signin", "/home").with_ban_message("Suspended");
        let admin = route(|r| r.admin = true);
        assert_eq!(
            gate.decide(&RequestContext::anonymous(), "/admin", &admin),
            Decision::Redirect("/home".into())
        );
        assert_eq!(
            gate.decide(&user(&["banned"]), "/", &RouteMatch::default()).location(),
            Some("/signin?error=Suspended")
        );
    }
}

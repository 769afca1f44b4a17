//! Route access rules driven by the session

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Sign-in, sign-up, OTP screens
    Public,
    /// Organisation setup, reachable only before it is done
    Onboarding,
    /// Everything behind the dashboard
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToSignIn,
    RedirectToOnboarding,
    RedirectToDashboard,
}

impl RouteDecision {
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            RouteDecision::Allow => None,
            RouteDecision::RedirectToSignIn => Some("/sign-in"),
            RouteDecision::RedirectToOnboarding => Some("/onboarding"),
            RouteDecision::RedirectToDashboard => Some("/dashboard"),
        }
    }
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn evaluate(session: &Session, route: RouteKind) -> RouteDecision {
        let configured = session
            .user
            .as_ref()
            .map(|u| u.has_organisation())
            .unwrap_or(false);

        match (route, session.is_authenticated(), configured) {
            (RouteKind::Public, false, _) => RouteDecision::Allow,
            (RouteKind::Public, true, true) => RouteDecision::RedirectToDashboard,
            (RouteKind::Public, true, false) => RouteDecision::RedirectToOnboarding,

            (RouteKind::Onboarding, false, _) => RouteDecision::RedirectToSignIn,
            (RouteKind::Onboarding, true, true) => RouteDecision::RedirectToDashboard,
            (RouteKind::Onboarding, true, false) => RouteDecision::Allow,

            (RouteKind::Protected, false, _) => RouteDecision::RedirectToSignIn,
            (RouteKind::Protected, true, false) => RouteDecision::RedirectToOnboarding,
            (RouteKind::Protected, true, true) => RouteDecision::Allow,
        }
    }
}

//! Access gate for the back-office and signed-in pages.
//!
//! Every request passes through [`access_gate`]. The path decides the
//! [`RouteClass`]; the session and, for admin paths only, the `admin_users`
//! allow-list decide the [`VisitorState`]. [`decide`] maps the pair to a
//! [`GateDecision`] without touching the database, so the whole table is
//! unit-tested below.
//!
//! | class \ visitor | anonymous | signed in | admin | lookup failed |
//! |---|---|---|---|---|
//! | public | pass | pass | pass | pass |
//! | signed-in only | login | pass | pass | pass |
//! | admin only | login | sign out, `not_admin` | pass | `check_failed` |
//!
//! A failed allow-list lookup never lets the request through.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use emporium_core::Email;

use super::auth::sign_out;
use crate::db::RepositoryError;
use crate::models::{CurrentUser, session::keys};
use crate::state::AppState;

/// Answers whether an email is on the back-office allow-list.
///
/// The server uses [`crate::db::AllowList`]; tests plug in fixed answers.
#[async_trait]
pub trait AdminCheck: Send + Sync {
    /// Whether `email` may enter the back-office.
    async fn is_admin(&self, email: &Email) -> Result<bool, RepositoryError>;
}

/// Which visitors a path is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    /// `/notes` and `/profile`.
    SignedIn,
    /// `/admin`.
    AdminOnly,
}

impl RouteClass {
    /// Classify a request path. A query string is ignored.
    #[must_use]
    pub fn of(path: &str) -> Self {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        if under(path, "/admin") {
            Self::AdminOnly
        } else if under(path, "/notes") || under(path, "/profile") {
            Self::SignedIn
        } else {
            Self::Public
        }
    }
}

/// `path` is `prefix` itself or below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// What is known about the visitor.
///
/// Admin status is only looked up on admin paths; elsewhere a signed-in
/// visitor is reported as [`VisitorState::AuthenticatedNonAdmin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorState {
    Unauthenticated,
    AuthenticatedNonAdmin,
    AuthenticatedAdmin,
    /// Signed in, but the allow-list could not be read.
    LookupFailed,
}

/// Outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Hand the request to the router.
    Allow,
    /// Send the visitor to the login page, returning to `path` afterwards.
    RequireLogin { path: String },
    /// Sign the visitor out and report that they are not an admin.
    RejectNonAdmin,
    /// Report that admin status could not be checked.
    RejectLookupFailed,
}

impl GateDecision {
    /// Redirect target for a rejection, `None` for [`GateDecision::Allow`].
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RequireLogin { path } => Some(login_redirect(path)),
            Self::RejectNonAdmin => Some("/login?error=not_admin".to_string()),
            Self::RejectLookupFailed => Some("/login?error=check_failed".to_string()),
        }
    }
}

/// Decide what happens to a request for `path` from `visitor`.
///
/// `path` may carry a query string; it is kept in the login redirect.
#[must_use]
pub fn decide(path: &str, visitor: VisitorState) -> GateDecision {
    match (RouteClass::of(path), visitor) {
        (RouteClass::Public, _)
        | (
            RouteClass::SignedIn,
            VisitorState::AuthenticatedNonAdmin
            | VisitorState::AuthenticatedAdmin
            | VisitorState::LookupFailed,
        )
        | (RouteClass::AdminOnly, VisitorState::AuthenticatedAdmin) => GateDecision::Allow,
        (RouteClass::SignedIn | RouteClass::AdminOnly, VisitorState::Unauthenticated) => {
            GateDecision::RequireLogin {
                path: path.to_owned(),
            }
        }
        (RouteClass::AdminOnly, VisitorState::AuthenticatedNonAdmin) => GateDecision::RejectNonAdmin,
        (RouteClass::AdminOnly, VisitorState::LookupFailed) => GateDecision::RejectLookupFailed,
    }
}

/// Login URL that returns to `path` after sign-in.
///
/// Slashes are left readable: `/admin/x` becomes `/login?redirect=/admin/x`.
#[must_use]
pub fn login_redirect(path: &str) -> String {
    format!(
        "/login?redirect={}",
        urlencoding::encode(path).replace("%2F", "/")
    )
}

/// Validate a post-login redirect target.
///
/// Only same-site paths are honoured: the target must start with `/` and must
/// not start with `//` or `/\`, which browsers treat as another host.
/// Anything else falls back to `/`.
#[must_use]
pub fn local_redirect(target: Option<&str>) -> &str {
    match target {
        Some(t)
            if t.starts_with('/')
                && !t.starts_with("//")
                && !t.starts_with("/\\")
                && !t.chars().any(char::is_control) =>
        {
            t
        }
        _ => "/",
    }
}

/// Middleware enforcing [`decide`] on every request.
///
/// Must run inside the session layer.
pub async fn access_gate(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), |pq| pq.as_str().to_owned());
    let class = RouteClass::of(&path);

    if class == RouteClass::Public {
        return next.run(request).await;
    }

    let user = session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten();

    let visitor = match (&user, class) {
        (None, _) => VisitorState::Unauthenticated,
        (Some(user), RouteClass::AdminOnly) => {
            match state.admin_check().is_admin(&user.email).await {
                Ok(true) => VisitorState::AuthenticatedAdmin,
                Ok(false) => VisitorState::AuthenticatedNonAdmin,
                Err(e) => {
                    tracing::error!(email = %user.email, error = %e, "Admin allow-list lookup failed");
                    VisitorState::LookupFailed
                }
            }
        }
        (Some(_), _) => VisitorState::AuthenticatedNonAdmin,
    };

    let decision = decide(&path, visitor);

    if decision == GateDecision::RejectNonAdmin {
        if let Some(user) = &user {
            tracing::warn!(email = %user.email, path = %path, "Non-admin denied back-office access");
        }
        if let Err(e) = sign_out(&session, state.supabase()).await {
            tracing::error!(error = %e, "Failed to clear session of non-admin");
        }
    }

    match decision.location() {
        None => next.run(request).await,
        Some(location) => Redirect::to(&location).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_classes() {
        assert_eq!(RouteClass::of("/admin"), RouteClass::AdminOnly);
        assert_eq!(RouteClass::of("/admin/products/3/edit"), RouteClass::AdminOnly);
        assert_eq!(RouteClass::of("/administrator"), RouteClass::Public);
        assert_eq!(RouteClass::of("/notes"), RouteClass::SignedIn);
        assert_eq!(RouteClass::of("/profile/"), RouteClass::SignedIn);
        assert_eq!(RouteClass::of("/products/notes"), RouteClass::Public);
        assert_eq!(RouteClass::of("/"), RouteClass::Public);
    }

    #[test]
    fn test_anonymous_admin_request_goes_to_login() {
        let decision = decide("/admin/x", VisitorState::Unauthenticated);
        assert_eq!(decision.location().as_deref(), Some("/login?redirect=/admin/x"));
    }

    #[test]
    fn test_query_string_survives_login_redirect() {
        assert_eq!(RouteClass::of("/admin?tab=1"), RouteClass::AdminOnly);
        assert_eq!(RouteClass::of("/notes?page=2"), RouteClass::SignedIn);

        let decision = decide("/admin/orders?status=pending", VisitorState::Unauthenticated);
        assert_eq!(
            decision.location().as_deref(),
            Some("/login?redirect=/admin/orders%3Fstatus%3Dpending")
        );
        assert_eq!(
            local_redirect(Some("/admin/orders?status=pending")),
            "/admin/orders?status=pending"
        );
    }

    #[test]
    fn test_non_admin_is_signed_out() {
        let decision = decide("/admin", VisitorState::AuthenticatedNonAdmin);
        assert_eq!(decision, GateDecision::RejectNonAdmin);
        assert_eq!(decision.location().as_deref(), Some("/login?error=not_admin"));
    }

    #[test]
    fn test_admin_passes() {
        assert_eq!(
            decide("/admin/orders/7", VisitorState::AuthenticatedAdmin),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_lookup_failure_fails_closed() {
        let decision = decide("/admin/products", VisitorState::LookupFailed);
        assert_eq!(decision.location().as_deref(), Some("/login?error=check_failed"));
    }

    #[test]
    fn test_signed_in_pages() {
        assert_eq!(
            decide("/notes", VisitorState::AuthenticatedNonAdmin),
            GateDecision::Allow
        );
        assert_eq!(
            decide("/profile", VisitorState::Unauthenticated).location().as_deref(),
            Some("/login?redirect=/profile")
        );
    }

    #[test]
    fn test_public_paths_always_pass() {
        for visitor in [
            VisitorState::Unauthenticated,
            VisitorState::AuthenticatedNonAdmin,
            VisitorState::AuthenticatedAdmin,
            VisitorState::LookupFailed,
        ] {
            assert_eq!(decide("/products/tea", visitor), GateDecision::Allow);
            assert_eq!(decide("/login", visitor), GateDecision::Allow);
        }
    }

    #[test]
    fn test_login_redirect_encodes_everything_but_slashes() {
        assert_eq!(
            login_redirect("/admin/a b&c"),
            "/login?redirect=/admin/a%20b%26c"
        );
    }

    #[test]
    fn test_local_redirect_rejects_other_hosts() {
        assert_eq!(local_redirect(Some("/admin/products")), "/admin/products");
        assert_eq!(local_redirect(Some("//evil.example")), "/");
        assert_eq!(local_redirect(Some("/\\evil.example")), "/");
        assert_eq!(local_redirect(Some("https://evil.example")), "/");
        assert_eq!(local_redirect(Some("admin")), "/");
        assert_eq!(local_redirect(None), "/");
    }
}

//! Authentication extractors and session helpers.
//!
//! Sign-in state is a [`CurrentUser`] stored in the session after a hosted
//! password sign-in. The access gate already redirects anonymous visitors away
//! from protected paths; [`RequireAuth`] gives handlers the user itself.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::gate::login_redirect;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session::keys};
use crate::supabase::SupabaseClient;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when a handler needs a user and there is none.
pub enum AuthRejection {
    /// Redirect to the login page, returning to `path` afterwards.
    RedirectToLogin(String),
    /// The session layer is missing.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(path) => Redirect::to(&login_redirect(&path)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                let target = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
                AuthRejection::RedirectToLogin(target.to_owned())
            })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in user in a fresh session.
///
/// The session id is cycled so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Sign the user out of the hosted service (best effort) and flush the session.
///
/// The cart and any remembered order go with the session.
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn sign_out(
    session: &Session,
    supabase: &SupabaseClient,
) -> Result<(), tower_sessions::session::Error> {
    if let Ok(Some(user)) = session.get::<CurrentUser>(keys::CURRENT_USER).await
        && let Err(e) = supabase.sign_out(&user.access_token).await
    {
        tracing::warn!(email = %user.email, error = %e, "Hosted sign-out failed");
    }

    session.flush().await?;
    clear_sentry_user();
    Ok(())
}

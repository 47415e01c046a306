//! Authentication route handlers.
//!
//! Handles password sign-in, sign-up and sign-out against the hosted auth
//! service. The session only ever holds a [`CurrentUser`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{AuthUserId, Email};

use crate::error::Result;
use crate::filters;
use crate::middleware::{local_redirect, set_current_user, sign_out};
use crate::models::CurrentUser;
use crate::routes::Layout;
use crate::state::AppState;
use crate::supabase::{AuthSession, SignUpOutcome, SupabaseError};

/// Shortest password accepted at sign-up.
const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Sign-up form data.
#[derive(Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
    pub error: Option<String>,
}

/// Message for an `error` code set by the access gate.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "not_admin" => "This account does not have access to the back-office.",
        "check_failed" => "We could not verify your access right now. Please try again.",
        _ => "Please sign in to continue.",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub redirect: String,
    pub error: Option<String>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
    /// Set once the account exists but awaits email confirmation.
    pub confirmation_sent: bool,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(layout))]
pub async fn login_page(layout: Layout, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        layout,
        email: String::new(),
        redirect: local_redirect(query.redirect.as_deref()).to_owned(),
        error: query
            .error
            .as_deref()
            .map(|code| login_error_message(code).to_owned()),
    }
}

/// Sign in with email and password.
#[instrument(skip(state, session, layout, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let redirect = local_redirect(form.redirect.as_deref()).to_owned();
    let email = form.email.trim();

    let result = state
        .supabase()
        .sign_in_with_password(email, &form.password)
        .await
        .and_then(|auth| current_user(auth, email));

    match result {
        Ok(user) => {
            set_current_user(&session, &user).await?;
            tracing::info!(email = %user.email, "User signed in");
            Ok(Redirect::to(&redirect).into_response())
        }
        Err(e) => {
            if matches!(e, SupabaseError::InvalidCredentials) {
                tracing::info!(email = %email, "Sign-in rejected");
            } else {
                tracing::error!(error = %e, "Sign-in failed");
            }
            Ok(LoginTemplate {
                layout,
                email: email.to_owned(),
                redirect,
                error: Some(e.user_message()),
            }
            .into_response())
        }
    }
}

/// Build the session identity from a hosted auth session.
///
/// The service normally echoes the email; the submitted one is the fallback.
fn current_user(auth: AuthSession, submitted_email: &str) -> std::result::Result<CurrentUser, SupabaseError> {
    let raw_email = auth.user.email.as_deref().unwrap_or(submitted_email);
    let email = Email::parse(raw_email)
        .map_err(|e| SupabaseError::Parse(format!("auth user has an invalid email: {e}")))?;

    Ok(CurrentUser {
        id: AuthUserId::new(auth.user.id),
        email,
        access_token: auth.access_token,
    })
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
#[instrument(skip(layout))]
pub async fn signup_page(layout: Layout) -> impl IntoResponse {
    SignupTemplate {
        layout,
        email: String::new(),
        error: None,
        confirmation_sent: false,
    }
}

/// Check a sign-up form before calling the auth service.
fn validate_signup(form: &SignupForm) -> std::result::Result<Email, String> {
    let email = Email::parse(form.email.trim()).map_err(|e| format!("Email address is not valid: {e}"))?;
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if form.password != form.password_confirm {
        return Err("Passwords do not match".to_owned());
    }
    Ok(email)
}

/// Create an account.
///
/// When the project auto-confirms accounts the user is signed in straight
/// away; otherwise the page asks them to check their email.
#[instrument(skip(state, session, layout, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let email = match validate_signup(&form) {
        Ok(email) => email,
        Err(message) => {
            return Ok(SignupTemplate {
                layout,
                email: form.email.trim().to_owned(),
                error: Some(message),
                confirmation_sent: false,
            }
            .into_response());
        }
    };

    let outcome = state
        .supabase()
        .sign_up(email.as_str(), &form.password)
        .await;

    match outcome {
        Ok(SignUpOutcome::SignedIn(auth)) => match current_user(auth, email.as_str()) {
            Ok(user) => {
                set_current_user(&session, &user).await?;
                tracing::info!(email = %user.email, "User signed up and signed in");
                Ok(Redirect::to("/").into_response())
            }
            Err(e) => {
                tracing::error!(error = %e, "Sign-up returned an unusable session");
                Ok(signup_error(layout, email, &e))
            }
        },
        Ok(SignUpOutcome::ConfirmationRequired(_)) => {
            tracing::info!(email = %email, "User signed up, confirmation pending");
            Ok(SignupTemplate {
                layout,
                email: email.into_inner(),
                error: None,
                confirmation_sent: true,
            }
            .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            Ok(signup_error(layout, email, &e))
        }
    }
}

fn signup_error(layout: Layout, email: Email, error: &SupabaseError) -> Response {
    SignupTemplate {
        layout,
        email: email.into_inner(),
        error: Some(error.user_message()),
        confirmation_sent: false,
    }
    .into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out and return to the home page.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    sign_out(&session, state.supabase()).await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signup_form(email: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            email: email.to_owned(),
            password: password.to_owned(),
            password_confirm: confirm.to_owned(),
        }
    }

    #[test]
    fn test_gate_error_codes_have_messages() {
        assert!(login_error_message("not_admin").contains("back-office"));
        assert!(login_error_message("check_failed").contains("try again"));
        assert_eq!(
            login_error_message("anything"),
            "Please sign in to continue."
        );
    }

    #[test]
    fn test_signup_validation() {
        assert!(validate_signup(&signup_form("a@b.co", "longenough", "longenough")).is_ok());
        assert!(
            validate_signup(&signup_form("nope", "longenough", "longenough"))
                .unwrap_err()
                .starts_with("Email")
        );
        assert!(
            validate_signup(&signup_form("a@b.co", "short", "short"))
                .unwrap_err()
                .contains("at least")
        );
        assert_eq!(
            validate_signup(&signup_form("a@b.co", "longenough", "different")).unwrap_err(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_current_user_prefers_service_email() {
        let auth: AuthSession = serde_json::from_value(serde_json::json!({
            "access_token": "token",
            "user": { "id": "8f14e45f-ceea-467f-a0e6-1b2b2c3d4e5f", "email": "Real@Example.com" }
        }))
        .unwrap();

        let user = current_user(auth, "typed@example.com").unwrap();
        assert_eq!(user.email.as_str(), "Real@Example.com");
        assert_eq!(user.access_token, "token");
    }
}

//! Admin allow-list handlers.
//!
//! The allow-list decides who may enter the back-office. Registered users
//! of the hosted auth service are listed alongside it so an admin can see
//! which addresses exist.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{AdminUserId, Email};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::AdminUser;
use crate::state::AppState;
use crate::supabase::AuthUser;

use super::AdminLayout;

const SECTION: &str = "/admin/users";

/// Registered users shown per page.
const AUTH_USERS_PER_PAGE: u32 = 100;

/// Add form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub email: String,
}

/// Hosted auth user as listed on the page.
#[derive(Debug, Clone)]
pub struct AuthUserView {
    pub email: String,
    pub confirmed: bool,
    pub last_sign_in: String,
    pub is_admin: bool,
}

/// Allow-list page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users/index.html")]
pub struct UsersTemplate {
    pub admin: AdminLayout,
    pub admins: Vec<AdminUser>,
    pub auth_users: Vec<AuthUserView>,
    /// Set when the hosted user listing failed.
    pub auth_users_error: Option<String>,
    pub error: Option<String>,
    pub email: String,
}

fn auth_user_view(user: &AuthUser, admins: &[AdminUser]) -> AuthUserView {
    let email = user.email.clone().unwrap_or_default();
    let lowered = email.to_lowercase();
    AuthUserView {
        is_admin: admins.iter().any(|a| a.email.normalized() == lowered),
        confirmed: user.email_confirmed_at.is_some(),
        last_sign_in: user
            .last_sign_in_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_owned()),
        email,
    }
}

async fn render_index(
    state: &AppState,
    admin: AdminLayout,
    email: String,
    error: Option<String>,
) -> Result<Response> {
    let admins = AdminUserRepository::new(state.pool()).list_all().await?;

    let (auth_users, auth_users_error) = match state
        .supabase()
        .list_users(1, AUTH_USERS_PER_PAGE)
        .await
    {
        Ok(users) => (
            users.iter().map(|u| auth_user_view(u, &admins)).collect(),
            None,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list auth users");
            (Vec::new(), Some(e.user_message()))
        }
    };

    Ok(UsersTemplate {
        admin,
        admins,
        auth_users,
        auth_users_error,
        error,
        email,
    }
    .into_response())
}

/// Show the allow-list and registered users.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    render_index(&state, AdminLayout::new(&user, SECTION), String::new(), None).await
}

/// Add an email to the allow-list.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddForm>,
) -> Result<Response> {
    let admin = AdminLayout::new(&user, SECTION);

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => {
            let message = format!("Email address is not valid: {e}");
            return render_index(&state, admin, form.email, Some(message)).await;
        }
    };

    match AdminUserRepository::new(state.pool()).add(&email).await {
        Ok(added) => {
            tracing::info!(email = %added.email, admin = %user.email, "Admin added");
            Ok(Redirect::to(SECTION).into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            let message = format!("{email} is already an admin");
            render_index(&state, admin, form.email, Some(message)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove an allow-list entry. Admins cannot remove themselves.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AdminUserId>,
) -> Result<Response> {
    let repo = AdminUserRepository::new(state.pool());
    let entry = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("admin {id}")))?;

    if entry.email.normalized() == user.email.normalized() {
        let admin = AdminLayout::new(&user, SECTION);
        let message = "You cannot remove your own access".to_owned();
        return render_index(&state, admin, String::new(), Some(message)).await;
    }

    repo.remove(id).await?;
    tracing::info!(email = %entry.email, admin = %user.email, "Admin removed");
    Ok(Redirect::to(SECTION).into_response())
}

//! Signed-in pages: profile and personal notes.
//!
//! The access gate redirects anonymous visitors before these run;
//! [`RequireAuth`] hands over the user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{NoteRepository, OrderRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Note, Order};
use crate::routes::Layout;
use crate::state::AppState;

const MAX_NOTE_LEN: usize = 500;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub email: String,
    pub orders: Vec<Order>,
}

/// Notes page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/notes.html")]
pub struct NotesTemplate {
    pub layout: Layout,
    pub notes: Vec<Note>,
    pub error: Option<String>,
}

/// New note form data.
#[derive(Debug, Deserialize)]
pub struct NoteForm {
    pub title: String,
}

/// Display the signed-in user's profile and the orders placed with their email.
#[instrument(skip(state, layout, user))]
pub async fn profile(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_by_email(&user.email)
        .await?;

    Ok(ProfileTemplate {
        layout,
        email: user.email.into_inner(),
        orders,
    })
}

/// List the signed-in user's notes.
#[instrument(skip(state, layout, user))]
pub async fn notes(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let notes = NoteRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(NotesTemplate {
        layout,
        notes,
        error: None,
    })
}

/// Create a note.
#[instrument(skip(state, layout, user))]
pub async fn create_note(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Form(form): Form<NoteForm>,
) -> Result<Response> {
    let repo = NoteRepository::new(state.pool());
    let title = form.title.trim();

    let error = if title.is_empty() {
        Some("A note needs some text".to_owned())
    } else if title.chars().count() > MAX_NOTE_LEN {
        Some(format!("Notes are limited to {MAX_NOTE_LEN} characters"))
    } else {
        None
    };

    if error.is_some() {
        let notes = repo.list_for_user(user.id).await?;
        return Ok(NotesTemplate {
            layout,
            notes,
            error,
        }
        .into_response());
    }

    repo.create(user.id, title).await?;
    Ok(Redirect::to("/notes").into_response())
}

//! Password sign-up, sign-in and sign-out against the auth service.

use serde::Serialize;
use serde_json::Value;

use super::types::UserPage;
use super::{AuthSession, AuthUser, KeyKind, SignUpOutcome, SupabaseClient, SupabaseError};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl SupabaseClient {
    /// Register a new user.
    ///
    /// Depending on the project settings the response is either a session
    /// (auto-confirm) or a bare user awaiting email confirmation.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the service rejects the sign-up, e.g.
    /// for a weak password or an already registered email.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, SupabaseError> {
        let body: Value = self
            .post("/auth/v1/signup", KeyKind::Anon, &Credentials { email, password })
            .await?;

        if body.get("access_token").is_some_and(|token| !token.is_null()) {
            let session: AuthSession = serde_json::from_value(body)
                .map_err(|e| SupabaseError::Parse(format!("invalid session: {e}")))?;
            return Ok(SignUpOutcome::SignedIn(session));
        }

        // Some project versions wrap the user, others return it bare
        let user_value = body.get("user").cloned().unwrap_or(body);
        let user: AuthUser = serde_json::from_value(user_value)
            .map_err(|e| SupabaseError::Parse(format!("invalid user: {e}")))?;
        Ok(SignUpOutcome::ConfirmationRequired(user))
    }

    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::InvalidCredentials` if the pair does not match.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let result = self
            .post(
                "/auth/v1/token?grant_type=password",
                KeyKind::Anon,
                &Credentials { email, password },
            )
            .await;

        match result {
            Err(SupabaseError::Api { status: 400, .. }) => Err(SupabaseError::InvalidCredentials),
            other => other,
        }
    }

    /// Revoke the refresh tokens behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Unauthorized` if the token already expired.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/v1/logout"))
            .header("apikey", self.inner.anon_key.as_str())
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::expect_success(response).await
    }

    /// One page of registered users. Requires the service role key.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Unauthorized` if the service key is rejected.
    pub async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<AuthUser>, SupabaseError> {
        let page: UserPage = self
            .get(
                &format!("/auth/v1/admin/users?page={page}&per_page={per_page}"),
                KeyKind::ServiceRole,
            )
            .await?;

        Ok(page.users)
    }
}

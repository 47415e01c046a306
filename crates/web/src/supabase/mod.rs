//! HTTP client for the hosted backend's auth and storage services.
//!
//! The project database is reached directly through `sqlx`; only the GoTrue
//! auth API and the storage API go through this client.
//!
//! # Keys
//!
//! - The anon key authorises sign-up, sign-in and sign-out.
//! - The service role key authorises storage writes and the admin user
//!   listing. It never leaves the server.
//!
//! # API Reference
//!
//! - Auth: `{SUPABASE_URL}/auth/v1`
//! - Storage: `{SUPABASE_URL}/storage/v1`

mod auth;
mod storage;
mod types;

pub use storage::{ObjectNameError, validate_object_name};
pub use types::*;

use std::sync::Arc;

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors that can occur when calling the hosted services.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Email and password did not match.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Key or user token rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SupabaseError {
    /// Message safe to show in a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::Api { status, message } if (400..500).contains(status) => message.clone(),
            _ => "The service is unavailable, please try again later".to_string(),
        }
    }
}

/// Which key authorises a request.
#[derive(Debug, Clone, Copy)]
enum KeyKind {
    Anon,
    ServiceRole,
}

/// Client for the hosted auth and storage APIs.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: SecretString,
}

/// Shapes of error bodies returned by the auth and storage APIs.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
    }
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("emporium/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
                service_role_key: config.service_role_key.clone(),
            }),
        })
    }

    /// Project URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Attach `apikey` and a bearer token for the chosen key.
    fn authorize(&self, request: RequestBuilder, key: KeyKind) -> RequestBuilder {
        let key = match key {
            KeyKind::Anon => self.inner.anon_key.as_str(),
            KeyKind::ServiceRole => self.inner.service_role_key.expose_secret(),
        };
        request.header("apikey", key).bearer_auth(key)
    }

    /// Execute a GET request.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        key: KeyKind,
    ) -> Result<T, SupabaseError> {
        let request = self.authorize(self.inner.client.get(self.url(path)), key);
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        key: KeyKind,
        body: &B,
    ) -> Result<T, SupabaseError> {
        let request = self.authorize(self.inner.client.post(self.url(path)), key);
        let response = request.json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| SupabaseError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Succeed on any 2xx response and ignore the body.
    async fn expect_success(response: reqwest::Response) -> Result<(), SupabaseError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    /// Parse an error response.
    async fn parse_error(response: reqwest::Response) -> SupabaseError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(text);

        match status {
            401 | 403 => SupabaseError::Unauthorized(message),
            404 => SupabaseError::NotFound(message),
            _ => SupabaseError::Api { status, message },
        }
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: "https://abcd.supabase.co/".to_string(),
            anon_key: "anon-key".to_string(),
            service_role_key: SecretString::from("service-key"),
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_has_no_trailing_slash() {
        assert_eq!(client().base_url(), "https://abcd.supabase.co");
        assert_eq!(
            client().url("/auth/v1/signup"),
            "https://abcd.supabase.co/auth/v1/signup"
        );
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("service-key"));
        assert!(!debug.contains("anon-key"));
    }

    #[test]
    fn test_error_body_prefers_msg() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"code":422,"msg":"Password should be at least 6 characters"}"#)
                .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Password should be at least 6 characters")
        );

        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn test_user_message_hides_server_errors() {
        let err = SupabaseError::Api {
            status: 500,
            message: "stack trace".to_string(),
        };
        assert!(!err.user_message().contains("stack trace"));

        let err = SupabaseError::Api {
            status: 422,
            message: "User already registered".to_string(),
        };
        assert_eq!(err.user_message(), "User already registered");
    }
}

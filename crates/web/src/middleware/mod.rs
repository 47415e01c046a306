//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, etc.)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Access gate (`/admin`, `/notes`, `/profile`)
//! 7. Rate limiting on sign-in and sign-up (governor)

pub mod auth;
pub mod gate;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, set_current_user, sign_out};
pub use gate::{AdminCheck, access_gate, local_redirect, login_redirect};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, configure_session_layer, create_session_layer};

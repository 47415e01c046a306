//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::EmporiumConfig;
use crate::db::AllowList;
use crate::middleware::AdminCheck;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: EmporiumConfig,
    pool: PgPool,
    supabase: SupabaseClient,
    admin_check: Arc<dyn AdminCheck>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for the hosted services cannot be built.
    pub fn new(config: EmporiumConfig, pool: PgPool) -> Result<Self, SupabaseError> {
        let admin_check = Arc::new(AllowList::new(pool.clone()));
        Self::with_admin_check(config, pool, admin_check)
    }

    /// Create application state that answers admin checks with `admin_check`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for the hosted services cannot be built.
    pub fn with_admin_check(
        config: EmporiumConfig,
        pool: PgPool,
        admin_check: Arc<dyn AdminCheck>,
    ) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                supabase,
                admin_check,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &EmporiumConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the hosted auth and storage client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Get the back-office allow-list check.
    #[must_use]
    pub fn admin_check(&self) -> &dyn AdminCheck {
        self.inner.admin_check.as_ref()
    }
}

//! Application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtKeys;
use crate::config::ApiConfig;
use crate::services::{ModerationService, Notifier};

/// Shared application state. The pool is the only cross-request resource;
/// every request scope borrows it from here.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pool: PgPool,
    pub jwt: Arc<JwtKeys>,
    pub notifier: Notifier,
    pub moderation: ModerationService,
}

impl AppState {
    /// Connect to the database and build the shared state.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        if config.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET must be set");
        }

        let pool = kazi_db::init_pool(&config.database_url).await?;
        let jwt = Arc::new(JwtKeys::new(&config.jwt_secret, config.jwt_expiry_hours));
        let notifier = Notifier::new(pool.clone());
        let moderation = ModerationService::new(pool.clone(), notifier.clone());

        Ok(Self {
            config,
            pool,
            jwt,
            notifier,
            moderation,
        })
    }
}

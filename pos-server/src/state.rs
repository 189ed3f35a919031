//! Application state shared by every handler

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::live::FanoutHub;
use crate::orders::OrderService;
use crate::store::PgStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool (read-only CRUD goes straight to `db::*`)
    pub pool: PgPool,
    /// Live connection registry
    pub hub: FanoutHub,
    /// Every table/order/order-item mutation goes through here
    pub orders: OrderService<PgStore, FanoutHub>,
    /// HS256 key for session cookies
    pub session_secret: String,
    pub session_max_age_days: i64,
    /// `Secure` attribute on the session cookie
    pub secure_cookies: bool,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect, migrate and optionally seed the database
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        if config.seed_demo_data
            && crate::db::seed::seed_if_empty(&pool, shared::util::now_millis()).await?
        {
            tracing::info!(
                username = crate::db::seed::DEMO_ADMIN_USERNAME,
                "Seeded demo restaurant"
            );
        }

        Ok(Self::with_pool(pool, config))
    }

    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        let hub = FanoutHub::new();
        let orders = OrderService::new(Arc::new(PgStore::new(pool.clone())), hub.clone());
        Self {
            pool,
            hub,
            orders,
            session_secret: config.session_secret.clone(),
            session_max_age_days: config.session_max_age_days,
            secure_cookies: !config.is_development(),
            rate_limiter: RateLimiter::new(),
        }
    }
}

//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 key for session cookies
    pub session_secret: String,
    pub session_max_age_days: i64,
    pub db_max_connections: u32,
    /// Insert the demo restaurant when the database is empty
    pub seed_demo_data: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_dev = environment == "development";

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parse_or("HTTP_PORT", 5000),
            session_secret: Self::require_secret("SESSION_SECRET", &environment)?,
            session_max_age_days: Self::parse_or("SESSION_MAX_AGE_DAYS", 30),
            db_max_connections: Self::parse_or("DB_MAX_CONNECTIONS", 10),
            seed_demo_data: Self::parse_or("SEED_DEMO_DATA", is_dev),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

use std::{sync::Arc, time::Duration};

use sqlx::postgres::PgConnectOptions;

use crate::auth::jwt::JwtKeys;
use crate::config::{AppConfig, DatabaseConfig, JwtConfig};
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Builds state from configuration. Pools connect on first use.
    pub fn new(config: AppConfig) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        let db = Database::new(config.database.clone());
        Self {
            db,
            config: Arc::new(config),
            jwt,
        }
    }

    pub fn init() -> anyhow::Result<Self> {
        Ok(Self::new(AppConfig::from_env()?))
    }

    /// State for tests: a database that is never reached unless a handler
    /// actually acquires a session.
    pub fn fake() -> Self {
        Self::new(AppConfig {
            app_name: "Tenflow".into(),
            api_prefix: "/api/v1".into(),
            database: DatabaseConfig {
                connect_options: PgConnectOptions::new()
                    .host("localhost")
                    .port(5432)
                    .username("postgres")
                    .password("postgres")
                    .database("postgres"),
                pool_size: 1,
                max_overflow: 0,
                pool_recycle: Duration::from_secs(60),
                pool_timeout: Duration::from_secs(1),
            },
            jwt: JwtConfig {
                secret: "test".into(),
                algorithm: jsonwebtoken::Algorithm::HS256,
                ttl_minutes: 5,
            },
            allowed_origins: vec!["http://localhost:5173".into()],
            log_level: "info".into(),
        })
    }
}

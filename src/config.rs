use std::{str::FromStr, time::Duration};

use anyhow::Context;
use jsonwebtoken::Algorithm;
use sqlx::postgres::PgConnectOptions;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

/// Connection target plus the sizing knobs shared by both pools.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connect_options: PgConnectOptions,
    pub pool_size: u32,
    pub max_overflow: u32,
    pub pool_recycle: Duration,
    pub pool_timeout: Duration,
}

impl DatabaseConfig {
    /// Upper bound on open connections per pool.
    pub fn max_connections(&self) -> u32 {
        (self.pool_size + self.max_overflow).max(1)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub api_prefix: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let num = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let algorithm_name = var("ALGORITHM", "HS256");
        let algorithm = Algorithm::from_str(algorithm_name.trim())
            .with_context(|| format!("unknown ALGORITHM {algorithm_name}"))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            anyhow::bail!("ALGORITHM {algorithm_name} is not an HMAC algorithm");
        }

        let secret = lookup("SECRET_KEY").context("SECRET_KEY must be set")?;
        if secret.is_empty() {
            anyhow::bail!("SECRET_KEY must not be empty");
        }

        let ttl_minutes = lookup("ACCESS_TOKEN_EXPIRE_MINUTES")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(30);
        if ttl_minutes <= 0 || ttl_minutes.checked_mul(60).is_none() {
            anyhow::bail!("ACCESS_TOKEN_EXPIRE_MINUTES {ttl_minutes} is out of range");
        }

        let jwt = JwtConfig {
            secret,
            algorithm,
            ttl_minutes,
        };

        let port = match lookup("POSTGRES_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid POSTGRES_PORT {raw}"))?,
            None => 5432,
        };

        let connect_options = match lookup("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).context("parse DATABASE_URL")?,
            None => PgConnectOptions::new()
                .host(&var("POSTGRES_HOST", "localhost"))
                .port(port)
                .username(&var("POSTGRES_USER", "postgres"))
                .password(&var("POSTGRES_PASSWORD", "password"))
                .database(&var("POSTGRES_DATABASE", "tenflow")),
        };

        let database = DatabaseConfig {
            connect_options,
            pool_size: num("DATABASE_POOL_SIZE", 5) as u32,
            max_overflow: num("DATABASE_MAX_OVERFLOW", 10) as u32,
            pool_recycle: Duration::from_secs(num("DATABASE_POOL_RECYCLE", 3600)),
            pool_timeout: Duration::from_secs(num("DATABASE_POOL_TIMEOUT", 30)),
        };

        let allowed_origins = var("ALLOWED_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            app_name: var("APP_NAME", "Tenflow"),
            api_prefix: var("API_V1_STR", "/api/v1"),
            database,
            jwt,
            allowed_origins,
            log_level: var("LOGLEVEL", "info").to_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = config_from(&[("SECRET_KEY", "s3cret")]).expect("config");
        assert_eq!(cfg.jwt.algorithm, Algorithm::HS256);
        assert_eq!(cfg.jwt.ttl_minutes, 30);
        assert_eq!(cfg.api_prefix, "/api/v1");
        assert_eq!(cfg.database.pool_size, 5);
        assert_eq!(cfg.database.max_connections(), 15);
        assert_eq!(cfg.database.pool_timeout, Duration::from_secs(30));
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("SECRET_KEY"));
    }

    #[test]
    fn asymmetric_algorithm_is_rejected() {
        let err = config_from(&[("SECRET_KEY", "x"), ("ALGORITHM", "RS256")]).unwrap_err();
        assert!(err.to_string().contains("HMAC"));

        assert!(config_from(&[("SECRET_KEY", "x"), ("ALGORITHM", "nope")]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config_from(&[
            ("SECRET_KEY", "x"),
            ("ALGORITHM", "HS512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "90"),
            ("DATABASE_POOL_SIZE", "2"),
            ("DATABASE_MAX_OVERFLOW", "0"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("LOGLEVEL", "DEBUG"),
            ("DATABASE_URL", "postgres://u:p@db.internal:6543/fit"),
        ])
        .expect("config");
        assert_eq!(cfg.jwt.algorithm, Algorithm::HS512);
        assert_eq!(cfg.jwt.ttl_minutes, 90);
        assert_eq!(cfg.database.max_connections(), 2);
        assert_eq!(cfg.database.connect_options.get_host(), "db.internal");
        assert_eq!(cfg.database.connect_options.get_port(), 6543);
        assert_eq!(cfg.allowed_origins.len(), 2);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn out_of_range_port_fails_instead_of_truncating() {
        let err = config_from(&[("SECRET_KEY", "x"), ("POSTGRES_PORT", "70000")]).unwrap_err();
        assert!(err.to_string().contains("POSTGRES_PORT"));
        assert!(config_from(&[("SECRET_KEY", "x"), ("POSTGRES_PORT", "db")]).is_err());

        let cfg = config_from(&[("SECRET_KEY", "x"), ("POSTGRES_PORT", "6543")]).expect("config");
        assert_eq!(cfg.database.connect_options.get_port(), 6543);
    }

    #[test]
    fn token_lifetime_must_be_positive_and_representable() {
        let huge = i64::MAX.to_string();
        for bad in ["0", "-5", huge.as_str()] {
            let err = config_from(&[("SECRET_KEY", "x"), ("ACCESS_TOKEN_EXPIRE_MINUTES", bad)])
                .unwrap_err();
            assert!(err.to_string().contains("ACCESS_TOKEN_EXPIRE_MINUTES"), "{bad}");
        }
    }
}

use std::time::Duration;

use anyhow::Context;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, error::AppError};

/// Signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    pub access_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            access_ttl: Duration::from_secs(
                u64::try_from(cfg.ttl_minutes).unwrap_or(0).saturating_mul(60),
            ),
        }
    }

    fn issue_at(&self, subject: Uuid, ttl: Duration, now: OffsetDateTime) -> anyhow::Result<String> {
        let secs = i64::try_from(ttl.as_secs()).context("token lifetime too large")?;
        let exp = now
            .checked_add(TimeDuration::seconds(secs))
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: subject,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id = %subject, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn issue(&self, subject: Uuid, ttl: Duration) -> anyhow::Result<String> {
        self.issue_at(subject, ttl, OffsetDateTime::now_utc())
    }

    /// Token with the configured lifetime.
    pub fn issue_access(&self, subject: Uuid) -> anyhow::Result<String> {
        self.issue(subject, self.access_ttl)
    }

    /// Checks signature, structure and expiry at instant `now`.
    /// A token is still accepted at exactly `exp`.
    fn claims_at(&self, token: &str, now: i64) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AppError::InvalidCredentials
        })?;
        if now > data.claims.exp {
            debug!(user_id = %data.claims.sub, exp = data.claims.exp, "jwt expired");
            return Err(AppError::InvalidCredentials);
        }
        Ok(data.claims)
    }

    /// Returns the subject of a valid token.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let claims = self.claims_at(token, OffsetDateTime::now_utc().unix_timestamp())?;
        debug!(user_id = %claims.sub, "jwt verified");
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 30,
        })
    }

    #[test]
    fn issue_and_validate_roundtrip() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue_access(user_id).expect("sign");
        assert_eq!(keys.validate(&token).expect("validate"), user_id);
    }

    #[test]
    fn claims_carry_expiry_from_ttl() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = keys
            .issue_at(Uuid::new_v4(), Duration::from_secs(120), now)
            .unwrap();
        let claims = keys.claims_at(&token, 1_700_000_000).unwrap();
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_120);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = keys.issue_at(Uuid::new_v4(), Duration::from_secs(60), now).unwrap();

        assert!(keys.claims_at(&token, 1_700_000_059).is_ok());
        assert!(keys.claims_at(&token, 1_700_000_060).is_ok());
        assert!(matches!(
            keys.claims_at(&token, 1_700_000_061),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn token_is_rejected_after_ttl_elapses() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - TimeDuration::minutes(31);
        let token = keys
            .issue_at(Uuid::new_v4(), keys.access_ttl, issued)
            .unwrap();
        assert!(matches!(keys.validate(&token), Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn consecutive_tokens_for_one_user_differ() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();

        let a = keys.issue_at(user_id, keys.access_ttl, now).unwrap();
        let b = keys.issue_at(user_id, keys.access_ttl, now).unwrap();
        assert_ne!(a, b);

        let a = keys.issue_access(user_id).unwrap();
        let b = keys.issue_access(user_id).unwrap();
        assert_ne!(a, b);
        assert_eq!(keys.validate(&a).unwrap(), keys.validate(&b).unwrap());
    }

    #[test]
    fn oversized_lifetimes_are_errors_not_panics() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        assert!(keys
            .issue(user_id, Duration::from_secs(1_000_000_000_000))
            .is_err());
        assert!(keys.issue(user_id, Duration::from_secs(u64::MAX)).is_err());

        // A century still fits and is valid right away.
        let token = keys
            .issue(user_id, Duration::from_secs(100 * 365 * 24 * 3600))
            .unwrap();
        assert_eq!(keys.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn lifetime_from_config_saturates() {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: i64::MAX,
        });
        assert_eq!(keys.access_ttl, Duration::from_secs(u64::MAX));
        assert!(keys.issue_access(Uuid::new_v4()).is_err());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let ours = make_keys("our-secret");
        let theirs = make_keys("their-secret");
        let token = theirs.issue_access(Uuid::new_v4()).unwrap();
        assert!(matches!(ours.validate(&token), Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let keys = make_keys("dev-secret");
        let other = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            algorithm: Algorithm::HS512,
            ttl_minutes: 30,
        });
        let token = other.issue_access(Uuid::new_v4()).unwrap();
        assert!(keys.validate(&token).is_err());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let keys = make_keys("dev-secret");
        for bad in ["", "garbage", "a.b.c", "Bearer x.y.z"] {
            assert!(matches!(keys.validate(bad), Err(AppError::InvalidCredentials)));
        }
    }

    #[test]
    fn token_without_uuid_subject_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "alice", "exp": i64::MAX }),
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert!(keys.validate(&token).is_err());
    }
}

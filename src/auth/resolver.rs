use tracing::{debug, warn};

use super::jwt::JwtKeys;
use crate::{
    db::Database,
    error::AppError,
    users::{repo_types::Principal, services::load_principal},
};

/// Validates `token` and loads its principal with the owned training plans.
///
/// The token is checked before any connection is taken, so forged or
/// expired tokens never occupy a pool slot. Loading runs in a read-only
/// session.
pub async fn resolve(keys: &JwtKeys, token: &str, db: &Database) -> Result<Principal, AppError> {
    let subject = keys.validate(token)?;

    let mut session = db.read_only().await?;
    let found = load_principal(&mut session, subject).await?;
    session.commit().await?;

    let principal = found.ok_or_else(|| {
        warn!(user_id = %subject, "token subject no longer exists");
        AppError::NotFound("User not found")
    })?;

    debug!(
        user_id = %principal.id(),
        plans = principal.training_plans.len(),
        "principal resolved"
    );
    Ok(principal)
}

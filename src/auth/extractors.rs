use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::resolver;
use crate::{error::AppError, state::AppState, users::repo_types::Principal};

/// Active, authenticated principal whose token is still the current one.
pub struct CurrentUser(pub Principal);

/// [`CurrentUser`] that also carries the superuser flag.
pub struct CurrentAdmin(pub Principal);

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    let auth = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::NotAuthenticated)?;

    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::NotAuthenticated)?;

    Ok(token.to_string())
}

/// Login-issued tokens double as a single active session: only the token
/// stored on the user row is honoured.
pub fn require_active_user(principal: &Principal, presented: &str) -> Result<(), AppError> {
    if !principal.user.is_active {
        warn!(user_id = %principal.id(), "inactive user");
        return Err(AppError::InactiveAccount);
    }
    match principal.user.access_token.as_deref() {
        Some(current) if !current.is_empty() && current == presented => Ok(()),
        _ => {
            warn!(user_id = %principal.id(), "token superseded or never issued");
            Err(AppError::InvalidCredentials)
        }
    }
}

pub fn require_admin(principal: &Principal) -> Result<(), AppError> {
    if !principal.user.is_superuser {
        warn!(user_id = %principal.id(), "superuser required");
        return Err(AppError::InsufficientPrivilege);
    }
    Ok(())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let principal = resolver::resolve(&state.jwt, &token, &state.db).await?;

        require_active_user(&principal, &token)?;
        Ok(CurrentUser(principal))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(&principal)?;
        Ok(CurrentAdmin(principal))
    }
}

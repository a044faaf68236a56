use axum::{extract::State, routing::post, Form, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::LoginForm,
        password::{verify_password, verify_unknown_account},
    },
    error::{AppError, AppResult},
    state::AppState,
    training_plans::repo as plans_repo,
    users::{
        repo_types::{Principal, User},
        services::normalize_email,
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Verifies credentials, issues a token and stores it on the user row,
/// which revokes any token issued by an earlier login.
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<Principal>> {
    let email = normalize_email(&form.username);

    let mut session = state.db.read_only().await?;
    let found = User::find_by_email(&mut session, &email).await?;
    session.commit().await?;

    let user = match found {
        Some(u) if verify_password(&form.password, &u.hashed_password) => u,
        Some(u) => {
            warn!(user_id = %u.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            verify_unknown_account(&form.password);
            warn!("login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !user.is_active {
        warn!(user_id = %user.id, "login on inactive account");
        return Err(AppError::InactiveAccount);
    }

    let token = state.jwt.issue_access(user.id)?;

    // The token only counts once this commit succeeds.
    let mut session = state.db.read_write().await?;
    let user = User::store_access_token(&mut session, user.id, &token).await?;
    let training_plans = plans_repo::list_by_user(&mut session, user.id).await?;
    session.commit().await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(Principal {
        user,
        training_plans,
    }))
}

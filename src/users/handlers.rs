use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{Pagination, UserCreate, UserPublicUpdate, UserUpdate},
    repo_types::{Principal, User},
    services,
};
use crate::{
    auth::{CurrentAdmin, CurrentUser},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(read_users).post(create_user))
        .route("/users/me", get(read_user_me).put(update_user_me))
        .route("/users/:id", get(read_user_by_id).put(update_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<Principal>> {
    Ok(Json(services::register(&state, payload).await?))
}

#[instrument(skip_all, fields(user_id = %principal.id()))]
pub async fn read_user_me(CurrentUser(principal): CurrentUser) -> Json<Principal> {
    Json(principal)
}

#[instrument(skip_all, fields(user_id = %principal.id()))]
pub async fn update_user_me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<UserPublicUpdate>,
) -> AppResult<Json<Principal>> {
    let updated = services::apply_update(&state, principal.id(), payload.into()).await?;
    Ok(Json(updated))
}

/// Users may read themselves; superusers may read anyone.
#[instrument(skip(state, principal), fields(caller = %principal.id()))]
pub async fn read_user_by_id(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Principal>> {
    if id == principal.id() {
        return Ok(Json(principal));
    }
    if !principal.user.is_superuser {
        return Err(AppError::Forbidden);
    }

    let mut session = state.db.read_only().await?;
    let found = services::load_principal(&mut session, id).await?;
    session.commit().await?;

    found
        .map(Json)
        .ok_or(AppError::NotFound("The user with this id does not exist."))
}

#[instrument(skip(state, admin), fields(caller = %admin.id()))]
pub async fn read_users(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Principal>>> {
    if page.skip < 0 || !(1..=1000).contains(&page.limit) {
        return Err(AppError::BadRequest(
            "skip must be >= 0 and limit between 1 and 1000".into(),
        ));
    }

    let mut session = state.db.read_only().await?;
    let users = User::list(&mut session, page.limit, page.skip).await?;
    let principals = services::with_plans(&mut session, users).await?;
    session.commit().await?;

    Ok(Json(principals))
}

#[instrument(skip(state, admin, payload), fields(caller = %admin.id()))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<Principal>> {
    Ok(Json(services::apply_update(&state, id, payload).await?))
}

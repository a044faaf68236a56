use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use sqlx::PgConnection;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{WorkoutCreate, WorkoutUpdate},
    repo,
    repo_types::PrescribedWorkout,
};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    state::AppState,
    training_plans::{dto::MessageResponse, services::owned_plan},
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/training-plans/:id/workouts",
            get(list_workouts).post(create_workout),
        )
        .route(
            "/prescribed-workouts/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

async fn owned_workout(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
) -> AppResult<PrescribedWorkout> {
    let workout = repo::find_by_id(conn, id)
        .await?
        .ok_or(AppError::NotFound("Prescribed workout not found"))?;
    if workout.user_id != user_id {
        warn!(workout_id = %id, %user_id, "workout owned by another user");
        return Err(AppError::Forbidden);
    }
    Ok(workout)
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn list_workouts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<Vec<PrescribedWorkout>>> {
    let mut session = state.db.read_only().await?;
    owned_plan(&mut session, plan_id, user.id()).await?;
    let workouts = repo::list_by_plan(&mut session, plan_id).await?;
    session.commit().await?;

    Ok(Json(workouts))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id()))]
pub async fn create_workout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<WorkoutCreate>,
) -> AppResult<Json<PrescribedWorkout>> {
    payload.validate()?;

    let mut session = state.db.read_write().await?;
    owned_plan(&mut session, plan_id, user.id()).await?;
    let workout = repo::insert(&mut session, plan_id, user.id(), &payload).await?;
    session.commit().await?;

    info!(workout_id = %workout.id, %plan_id, "workout prescribed");
    Ok(Json(workout))
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn get_workout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PrescribedWorkout>> {
    let mut session = state.db.read_only().await?;
    let workout = owned_workout(&mut session, id, user.id()).await?;
    session.commit().await?;

    Ok(Json(workout))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id()))]
pub async fn update_workout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkoutUpdate>,
) -> AppResult<Json<PrescribedWorkout>> {
    payload.validate()?;

    let mut session = state.db.read_write().await?;
    owned_workout(&mut session, id, user.id()).await?;
    let workout = repo::update(&mut session, id, &payload).await?;
    session.commit().await?;

    info!(workout_id = %id, "workout updated");
    Ok(Json(workout))
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn delete_workout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let mut session = state.db.read_write().await?;
    owned_workout(&mut session, id, user.id()).await?;
    repo::delete_cascade(&mut session, id).await?;
    session.commit().await?;

    info!(workout_id = %id, "workout deleted");
    Ok(Json(MessageResponse {
        message: "Prescribed workout deleted successfully",
    }))
}

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        CountQuery, CountResponse, ListQuery, MessageResponse, TrainingPlanCreate,
        TrainingPlanUpdate,
    },
    repo,
    repo_types::TrainingPlan,
    services::owned_plan,
};
use crate::{auth::CurrentUser, error::AppResult, state::AppState};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/training-plans", get(list_plans).post(create_plan))
        .route("/training-plans/stats/count", get(count_plans))
        .route(
            "/training-plans/:id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id()))]
pub async fn create_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<TrainingPlanCreate>,
) -> AppResult<Json<TrainingPlan>> {
    payload.validate()?;

    let mut session = state.db.read_write().await?;
    let plan = repo::insert(&mut session, user.id(), &payload).await?;
    session.commit().await?;

    info!(plan_id = %plan.id, "training plan created");
    Ok(Json(plan))
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn list_plans(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<Vec<TrainingPlan>>> {
    q.validate()?;

    let mut session = state.db.read_only().await?;
    let plans = repo::list_page(&mut session, user.id(), q.is_active, q.limit, q.skip).await?;
    session.commit().await?;

    Ok(Json(plans))
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn count_plans(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<CountQuery>,
) -> AppResult<Json<CountResponse>> {
    let mut session = state.db.read_only().await?;
    let count = repo::count(&mut session, user.id(), q.is_active).await?;
    session.commit().await?;

    Ok(Json(CountResponse { count }))
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn get_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingPlan>> {
    let mut session = state.db.read_only().await?;
    let plan = owned_plan(&mut session, id, user.id()).await?;
    session.commit().await?;

    Ok(Json(plan))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id()))]
pub async fn update_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TrainingPlanUpdate>,
) -> AppResult<Json<TrainingPlan>> {
    let mut session = state.db.read_write().await?;
    let current = owned_plan(&mut session, id, user.id()).await?;
    payload.validate_against(&current)?;
    let plan = repo::update(&mut session, id, &payload).await?;
    session.commit().await?;

    info!(plan_id = %plan.id, "training plan updated");
    Ok(Json(plan))
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn delete_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let mut session = state.db.read_write().await?;
    owned_plan(&mut session, id, user.id()).await?;
    repo::delete_cascade(&mut session, id).await?;
    session.commit().await?;

    info!(plan_id = %id, "training plan deleted");
    Ok(Json(MessageResponse {
        message: "Training plan deleted successfully",
    }))
}

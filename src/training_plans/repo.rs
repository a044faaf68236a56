use sqlx::PgConnection;
use uuid::Uuid;

use super::{
    dto::{TrainingPlanCreate, TrainingPlanUpdate},
    repo_types::TrainingPlan,
};

const COLUMNS: &str = "id, user_id, goal, plan_name, start_date, end_date, duration_weeks, \
     fitness_level, weekly_distance_base, weekly_distance_peak, training_days_per_week, \
     plan_data, is_active, created_at, updated_at";

/// All plans owned by a user, newest first.
pub async fn list_by_user(conn: &mut PgConnection, user_id: Uuid) -> sqlx::Result<Vec<TrainingPlan>> {
    sqlx::query_as::<_, TrainingPlan>(&format!(
        "SELECT {COLUMNS} FROM training_plans WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn list_page(
    conn: &mut PgConnection,
    user_id: Uuid,
    is_active: Option<bool>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<TrainingPlan>> {
    sqlx::query_as::<_, TrainingPlan>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM training_plans
        WHERE user_id = $1 AND ($2::boolean IS NULL OR is_active = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    ))
    .bind(user_id)
    .bind(is_active)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await
}

pub async fn count(conn: &mut PgConnection, user_id: Uuid, is_active: Option<bool>) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM training_plans
        WHERE user_id = $1 AND ($2::boolean IS NULL OR is_active = $2)
        "#,
    )
    .bind(user_id)
    .bind(is_active)
    .fetch_one(&mut *conn)
    .await
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<TrainingPlan>> {
    sqlx::query_as::<_, TrainingPlan>(&format!(
        "SELECT {COLUMNS} FROM training_plans WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    user_id: Uuid,
    plan: &TrainingPlanCreate,
) -> sqlx::Result<TrainingPlan> {
    sqlx::query_as::<_, TrainingPlan>(&format!(
        r#"
        INSERT INTO training_plans (
            id, user_id, goal, plan_name, start_date, end_date, duration_weeks,
            fitness_level, weekly_distance_base, weekly_distance_peak,
            training_days_per_week, plan_data, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&plan.goal)
    .bind(&plan.plan_name)
    .bind(plan.start_date)
    .bind(plan.end_date)
    .bind(plan.duration_weeks)
    .bind(&plan.fitness_level)
    .bind(plan.weekly_distance_base)
    .bind(plan.weekly_distance_peak)
    .bind(plan.training_days_per_week)
    .bind(&plan.plan_data)
    .bind(plan.is_active)
    .fetch_one(&mut *conn)
    .await
}

pub async fn update(
    conn: &mut PgConnection,
    id: Uuid,
    patch: &TrainingPlanUpdate,
) -> sqlx::Result<TrainingPlan> {
    sqlx::query_as::<_, TrainingPlan>(&format!(
        r#"
        UPDATE training_plans SET
            goal                   = COALESCE($2, goal),
            plan_name              = COALESCE($3, plan_name),
            start_date             = COALESCE($4, start_date),
            end_date               = COALESCE($5, end_date),
            duration_weeks         = COALESCE($6, duration_weeks),
            fitness_level          = COALESCE($7, fitness_level),
            weekly_distance_base   = COALESCE($8, weekly_distance_base),
            weekly_distance_peak   = COALESCE($9, weekly_distance_peak),
            training_days_per_week = COALESCE($10, training_days_per_week),
            plan_data              = COALESCE($11, plan_data),
            is_active              = COALESCE($12, is_active),
            updated_at             = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&patch.goal)
    .bind(&patch.plan_name)
    .bind(patch.start_date)
    .bind(patch.end_date)
    .bind(patch.duration_weeks)
    .bind(&patch.fitness_level)
    .bind(patch.weekly_distance_base)
    .bind(patch.weekly_distance_peak)
    .bind(patch.training_days_per_week)
    .bind(&patch.plan_data)
    .bind(patch.is_active)
    .fetch_one(&mut *conn)
    .await
}

/// Deletes a plan together with its prescribed workouts and the activities
/// linked to those workouts. Callers run this inside one read-write session.
pub async fn delete_cascade(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<u64> {
    sqlx::query(
        r#"
        DELETE FROM training_activities
        WHERE prescribed_workout_id IN (
            SELECT id FROM prescribed_workouts WHERE training_plan_id = $1
        )
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM prescribed_workouts WHERE training_plan_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let res = sqlx::query("DELETE FROM training_plans WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

/// Plans for several users at once, grouped by the caller.
pub async fn list_by_users(conn: &mut PgConnection, user_ids: &[Uuid]) -> sqlx::Result<Vec<TrainingPlan>> {
    sqlx::query_as::<_, TrainingPlan>(&format!(
        "SELECT {COLUMNS} FROM training_plans WHERE user_id = ANY($1) ORDER BY created_at DESC"
    ))
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await
}

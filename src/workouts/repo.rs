use sqlx::PgConnection;
use uuid::Uuid;

use super::{
    dto::{WorkoutCreate, WorkoutUpdate},
    repo_types::PrescribedWorkout,
};

const COLUMNS: &str = "id, training_plan_id, user_id, workout_date, workout_time, workout_type, \
     distance, duration_minutes, intensity_zone, rpe_target, workout_description, workout_data, \
     is_completed, created_at, updated_at";

pub async fn list_by_plan(
    conn: &mut PgConnection,
    plan_id: Uuid,
) -> sqlx::Result<Vec<PrescribedWorkout>> {
    sqlx::query_as::<_, PrescribedWorkout>(&format!(
        "SELECT {COLUMNS} FROM prescribed_workouts \
         WHERE training_plan_id = $1 ORDER BY workout_date ASC, workout_time ASC"
    ))
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn find_by_id(
    conn: &mut PgConnection,
    id: Uuid,
) -> sqlx::Result<Option<PrescribedWorkout>> {
    sqlx::query_as::<_, PrescribedWorkout>(&format!(
        "SELECT {COLUMNS} FROM prescribed_workouts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    plan_id: Uuid,
    user_id: Uuid,
    w: &WorkoutCreate,
) -> sqlx::Result<PrescribedWorkout> {
    sqlx::query_as::<_, PrescribedWorkout>(&format!(
        r#"
        INSERT INTO prescribed_workouts (
            id, training_plan_id, user_id, workout_date, workout_time, workout_type,
            distance, duration_minutes, intensity_zone, rpe_target, workout_description,
            workout_data, is_completed
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(plan_id)
    .bind(user_id)
    .bind(w.workout_date)
    .bind(w.workout_time)
    .bind(&w.workout_type)
    .bind(w.distance)
    .bind(w.duration_minutes)
    .bind(w.intensity_zone)
    .bind(w.rpe_target)
    .bind(&w.workout_description)
    .bind(&w.workout_data)
    .bind(w.is_completed)
    .fetch_one(&mut *conn)
    .await
}

pub async fn update(
    conn: &mut PgConnection,
    id: Uuid,
    patch: &WorkoutUpdate,
) -> sqlx::Result<PrescribedWorkout> {
    sqlx::query_as::<_, PrescribedWorkout>(&format!(
        r#"
        UPDATE prescribed_workouts SET
            workout_date        = COALESCE($2, workout_date),
            workout_time        = COALESCE($3, workout_time),
            workout_type        = COALESCE($4, workout_type),
            distance            = COALESCE($5, distance),
            duration_minutes    = COALESCE($6, duration_minutes),
            intensity_zone      = COALESCE($7, intensity_zone),
            rpe_target          = COALESCE($8, rpe_target),
            workout_description = COALESCE($9, workout_description),
            workout_data        = COALESCE($10, workout_data),
            is_completed        = COALESCE($11, is_completed),
            updated_at          = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(patch.workout_date)
    .bind(patch.workout_time)
    .bind(&patch.workout_type)
    .bind(patch.distance)
    .bind(patch.duration_minutes)
    .bind(patch.intensity_zone)
    .bind(patch.rpe_target)
    .bind(&patch.workout_description)
    .bind(&patch.workout_data)
    .bind(patch.is_completed)
    .fetch_one(&mut *conn)
    .await
}

/// Removes the workout and the activities linked to it.
pub async fn delete_cascade(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<u64> {
    sqlx::query("DELETE FROM training_activities WHERE prescribed_workout_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let res = sqlx::query("DELETE FROM prescribed_workouts WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

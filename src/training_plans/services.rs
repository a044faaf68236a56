use sqlx::PgConnection;
use tracing::warn;
use uuid::Uuid;

use super::{repo, repo_types::TrainingPlan};
use crate::error::{AppError, AppResult};

/// Loads plan `plan_id` and checks that `user_id` owns it.
pub async fn owned_plan(
    conn: &mut PgConnection,
    plan_id: Uuid,
    user_id: Uuid,
) -> AppResult<TrainingPlan> {
    let plan = repo::find_by_id(conn, plan_id)
        .await?
        .ok_or(AppError::NotFound("Training plan not found"))?;
    ensure_owner(&plan, user_id)?;
    Ok(plan)
}

fn ensure_owner(plan: &TrainingPlan, user_id: Uuid) -> AppResult<()> {
    if plan.user_id != user_id {
        warn!(plan_id = %plan.id, %user_id, "plan owned by another user");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};

    fn plan_of(owner: Uuid) -> TrainingPlan {
        TrainingPlan {
            id: Uuid::new_v4(),
            user_id: owner,
            goal: "10k".into(),
            plan_name: "Base".into(),
            start_date: date!(2025 - 01 - 06),
            end_date: date!(2025 - 03 - 02),
            duration_weeks: 8,
            fitness_level: "beginner".into(),
            weekly_distance_base: 15.0,
            weekly_distance_peak: 30.0,
            training_days_per_week: 3,
            plan_data: None,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn owner_passes_stranger_is_forbidden() {
        let owner = Uuid::new_v4();
        let plan = plan_of(owner);
        assert!(ensure_owner(&plan, owner).is_ok());
        assert!(matches!(
            ensure_owner(&plan, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Training plan record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal: String,
    pub plan_name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub duration_weeks: i32,
    pub fitness_level: String,
    pub weekly_distance_base: f64,     // km
    pub weekly_distance_peak: f64,     // km
    pub training_days_per_week: i32,
    pub plan_data: Option<serde_json::Value>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

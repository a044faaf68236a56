use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workout_time_of_day", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkoutTimeOfDay {
    Morning,
    Afternoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "intensity_zone", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IntensityZone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
}

/// Single workout prescribed by a training plan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PrescribedWorkout {
    pub id: Uuid,
    pub training_plan_id: Uuid,
    pub user_id: Uuid,
    pub workout_date: Date,
    pub workout_time: WorkoutTimeOfDay,
    pub workout_type: String,
    pub distance: f64, // km
    pub duration_minutes: Option<i32>,
    pub intensity_zone: Option<IntensityZone>,
    pub rpe_target: Option<i32>,
    pub workout_description: Option<String>,
    pub workout_data: Option<serde_json::Value>,
    pub is_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

use serde::Deserialize;
use time::Date;

use super::repo_types::{IntensityZone, WorkoutTimeOfDay};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct WorkoutCreate {
    pub workout_date: Date,
    pub workout_time: WorkoutTimeOfDay,
    pub workout_type: String,
    pub distance: f64,
    pub duration_minutes: Option<i32>,
    pub intensity_zone: Option<IntensityZone>,
    pub rpe_target: Option<i32>,
    pub workout_description: Option<String>,
    pub workout_data: Option<serde_json::Value>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutUpdate {
    pub workout_date: Option<Date>,
    pub workout_time: Option<WorkoutTimeOfDay>,
    pub workout_type: Option<String>,
    pub distance: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub intensity_zone: Option<IntensityZone>,
    pub rpe_target: Option<i32>,
    pub workout_description: Option<String>,
    pub workout_data: Option<serde_json::Value>,
    pub is_completed: Option<bool>,
}

fn bad(msg: &str) -> AppError {
    AppError::BadRequest(msg.into())
}

fn check_fields(
    workout_type: Option<&str>,
    distance: Option<f64>,
    duration_minutes: Option<i32>,
    rpe_target: Option<i32>,
    description: Option<&str>,
) -> Result<(), AppError> {
    if let Some(t) = workout_type {
        if t.trim().is_empty() || t.chars().count() > 50 {
            return Err(bad("workout_type must be 1 to 50 characters"));
        }
    }
    if let Some(d) = distance {
        if !d.is_finite() || d < 0.0 {
            return Err(bad("distance must be non-negative"));
        }
    }
    if duration_minutes.is_some_and(|m| m < 0) {
        return Err(bad("duration_minutes must be non-negative"));
    }
    if rpe_target.is_some_and(|r| !(1..=10).contains(&r)) {
        return Err(bad("rpe_target must be between 1 and 10"));
    }
    if description.is_some_and(|d| d.chars().count() > 1000) {
        return Err(bad("workout_description is limited to 1000 characters"));
    }
    Ok(())
}

impl WorkoutCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        check_fields(
            Some(&self.workout_type),
            Some(self.distance),
            self.duration_minutes,
            self.rpe_target,
            self.workout_description.as_deref(),
        )
    }
}

impl WorkoutUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        check_fields(
            self.workout_type.as_deref(),
            self.distance,
            self.duration_minutes,
            self.rpe_target,
            self.workout_description.as_deref(),
        )
    }
}

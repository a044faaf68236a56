use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::AppError;

const MAX_LABEL_LEN: usize = 50;

/// Request body for creating a training plan.
#[derive(Debug, Deserialize)]
pub struct TrainingPlanCreate {
    pub goal: String,
    pub plan_name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub duration_weeks: i32,
    pub fitness_level: String,
    pub weekly_distance_base: f64,
    pub weekly_distance_peak: f64,
    pub training_days_per_week: i32,
    #[serde(default)]
    pub plan_data: Option<serde_json::Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct TrainingPlanUpdate {
    pub goal: Option<String>,
    pub plan_name: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub duration_weeks: Option<i32>,
    pub fitness_level: Option<String>,
    pub weekly_distance_base: Option<f64>,
    pub weekly_distance_peak: Option<f64>,
    pub training_days_per_week: Option<i32>,
    pub plan_data: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub is_active: Option<bool>,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn check_label(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() || value.chars().count() > MAX_LABEL_LEN {
        return Err(AppError::BadRequest(format!(
            "{field} must be 1 to {MAX_LABEL_LEN} characters"
        )));
    }
    Ok(())
}

fn check_shape(
    start: Date,
    end: Date,
    duration_weeks: i32,
    days_per_week: i32,
    base: f64,
    peak: f64,
) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::BadRequest("end_date must not precede start_date".into()));
    }
    if duration_weeks < 1 {
        return Err(AppError::BadRequest("duration_weeks must be positive".into()));
    }
    if !(1..=7).contains(&days_per_week) {
        return Err(AppError::BadRequest(
            "training_days_per_week must be between 1 and 7".into(),
        ));
    }
    if !(base.is_finite() && peak.is_finite()) || base < 0.0 || peak < 0.0 {
        return Err(AppError::BadRequest("weekly distances must be non-negative".into()));
    }
    Ok(())
}

impl TrainingPlanCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        check_label("goal", &self.goal)?;
        check_label("plan_name", &self.plan_name)?;
        check_label("fitness_level", &self.fitness_level)?;
        check_shape(
            self.start_date,
            self.end_date,
            self.duration_weeks,
            self.training_days_per_week,
            self.weekly_distance_base,
            self.weekly_distance_peak,
        )
    }
}

impl TrainingPlanUpdate {
    /// Validates the update as applied on top of `current`.
    pub fn validate_against(
        &self,
        current: &super::repo_types::TrainingPlan,
    ) -> Result<(), AppError> {
        for (field, value) in [
            ("goal", &self.goal),
            ("plan_name", &self.plan_name),
            ("fitness_level", &self.fitness_level),
        ] {
            if let Some(v) = value {
                check_label(field, v)?;
            }
        }
        check_shape(
            self.start_date.unwrap_or(current.start_date),
            self.end_date.unwrap_or(current.end_date),
            self.duration_weeks.unwrap_or(current.duration_weeks),
            self.training_days_per_week
                .unwrap_or(current.training_days_per_week),
            self.weekly_distance_base
                .unwrap_or(current.weekly_distance_base),
            self.weekly_distance_peak
                .unwrap_or(current.weekly_distance_peak),
        )
    }
}

impl ListQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.skip < 0 {
            return Err(AppError::BadRequest("skip must be >= 0".into()));
        }
        if !(1..=1000).contains(&self.limit) {
            return Err(AppError::BadRequest("limit must be between 1 and 1000".into()));
        }
        Ok(())
    }
}

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::training_plans::repo_types::TrainingPlan;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,           // Argon2 hash, not exposed in JSON
    pub is_active: bool,
    pub is_superuser: bool,
    pub access_token: Option<String>,      // token issued by the latest login
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// An authenticated user together with the plans it owns.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    #[serde(flatten)]
    pub user: User,
    pub training_plans: Vec<TrainingPlan>,
}

impl Principal {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

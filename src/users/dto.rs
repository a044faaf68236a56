use serde::Deserialize;

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Fields a user may change on their own account.
#[derive(Debug, Default, Deserialize)]
pub struct UserPublicUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

/// Admin update; also toggles activity and privilege.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl From<UserPublicUpdate> for UserUpdate {
    fn from(u: UserPublicUpdate) -> Self {
        Self {
            email: u.email,
            full_name: u.full_name,
            password: u.password,
            is_active: None,
            is_superuser: None,
        }
    }
}

use sqlx::PgConnection;
use uuid::Uuid;

use super::repo_types::User;

const COLUMNS: &str = "id, email, full_name, hashed_password, is_active, is_superuser, \
     access_token, created_at, updated_at";

impl User {
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a user by (normalised) email.
    pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn list(conn: &mut PgConnection, limit: i64, offset: i64) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
    }

    /// Create a new user with hashed password.
    pub async fn create(
        conn: &mut PgConnection,
        email: &str,
        full_name: Option<&str>,
        hashed_password: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, full_name, hashed_password)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(full_name)
        .bind(hashed_password)
        .fetch_one(&mut *conn)
        .await
    }

    /// Overwrites the stored token, revoking whatever was issued before.
    pub async fn store_access_token(
        conn: &mut PgConnection,
        id: Uuid,
        token: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET access_token = $2, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(token)
        .fetch_one(&mut *conn)
        .await
    }

    /// Applies the provided fields; `None` keeps the stored value.
    pub async fn update(conn: &mut PgConnection, id: Uuid, changes: &UserChanges) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                email           = COALESCE($2, email),
                full_name       = COALESCE($3, full_name),
                hashed_password = COALESCE($4, hashed_password),
                is_active       = COALESCE($5, is_active),
                is_superuser    = COALESCE($6, is_superuser),
                updated_at      = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.full_name)
        .bind(&changes.hashed_password)
        .bind(changes.is_active)
        .bind(changes.is_superuser)
        .fetch_one(&mut *conn)
        .await
    }
}

/// Column changes for [`User::update`]. The password is already hashed.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

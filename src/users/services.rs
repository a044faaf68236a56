use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgConnection;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{UserCreate, UserUpdate},
    repo::UserChanges,
    repo_types::{Principal, User},
};
use crate::{
    auth::password::hash_password,
    error::{AppError, AppResult},
    state::AppState,
    training_plans::repo as plans_repo,
};

const MIN_PASSWORD_LEN: usize = 8;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn checked_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) || email.len() > 255 {
        warn!(email = %email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    Ok(email)
}

fn checked_password_hash(plain: &str) -> AppResult<String> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest("Password too short".into()));
    }
    Ok(hash_password(plain)?)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == "23505")
}

fn email_taken() -> AppError {
    AppError::BadRequest("The user with this email already exists.".into())
}

/// User row plus its plans, or `None` when the id is unknown.
pub async fn load_principal(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Principal>> {
    let Some(user) = User::find_by_id(conn, id).await? else {
        return Ok(None);
    };
    let training_plans = plans_repo::list_by_user(conn, user.id).await?;
    Ok(Some(Principal {
        user,
        training_plans,
    }))
}

/// Attaches plans to a page of users with a single extra query.
pub async fn with_plans(conn: &mut PgConnection, users: Vec<User>) -> AppResult<Vec<Principal>> {
    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let mut by_user: HashMap<Uuid, Vec<_>> = HashMap::new();
    for plan in plans_repo::list_by_users(conn, &ids).await? {
        by_user.entry(plan.user_id).or_default().push(plan);
    }
    Ok(users
        .into_iter()
        .map(|user| Principal {
            training_plans: by_user.remove(&user.id).unwrap_or_default(),
            user,
        })
        .collect())
}

pub async fn register(state: &AppState, payload: UserCreate) -> AppResult<Principal> {
    let email = checked_email(&payload.email)?;
    let hashed = checked_password_hash(&payload.password)?;
    let full_name = payload.full_name.as_deref().map(str::trim);

    let mut session = state.db.read_write().await?;
    if User::find_by_email(&mut session, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(email_taken());
    }
    let user = match User::create(&mut session, &email, full_name, &hashed).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    };
    session.commit().await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Principal {
        user,
        training_plans: Vec::new(),
    })
}

/// Applies `update` to user `id` and returns the refreshed principal.
pub async fn apply_update(state: &AppState, id: Uuid, update: UserUpdate) -> AppResult<Principal> {
    let email = update.email.as_deref().map(checked_email).transpose()?;
    let hashed_password = update
        .password
        .as_deref()
        .map(checked_password_hash)
        .transpose()?;

    let mut session = state.db.read_write().await?;
    if let Some(email) = &email {
        if let Some(other) = User::find_by_email(&mut session, email).await? {
            if other.id != id {
                return Err(email_taken());
            }
        }
    }

    let changes = UserChanges {
        email,
        full_name: update.full_name.map(|n| n.trim().to_string()),
        hashed_password,
        is_active: update.is_active,
        is_superuser: update.is_superuser,
    };
    let user = match User::update(&mut session, id, &changes).await {
        Ok(u) => u,
        Err(sqlx::Error::RowNotFound) => return Err(AppError::NotFound("User not found")),
        Err(e) if is_unique_violation(&e) => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    };
    let training_plans = plans_repo::list_by_user(&mut session, user.id).await?;
    session.commit().await?;

    info!(user_id = %user.id, "user updated");
    Ok(Principal {
        user,
        training_plans,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalisation_and_validation() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("not an email"));
        assert!(checked_email(" Bob@Example.com").is_ok());
        assert!(matches!(checked_email("bob"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn short_passwords_are_rejected_before_hashing() {
        assert!(matches!(
            checked_password_hash("short"),
            Err(AppError::BadRequest(_))
        ));
        let hash = checked_password_hash("secret123").unwrap();
        assert!(crate::auth::password::verify_password("secret123", &hash));
    }
}

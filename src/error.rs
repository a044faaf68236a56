//! Application error type and its HTTP mapping.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// No usable `Authorization: Bearer` header on the request.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Wrong password, or a token that is forged, expired or superseded.
    #[error("Could not validate credentials")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveAccount,

    #[error("The user doesn't have enough privileges")]
    InsufficientPrivilege,

    /// Caller is authenticated but does not own the resource.
    #[error("Not enough permissions")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    /// The connection pool could not hand out a connection.
    #[error("Database unavailable")]
    Unavailable(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InactiveAccount
            | AppError::InsufficientPrivilege
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server-side failures stay opaque.
    fn detail(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }

    fn log(&self) {
        match self {
            AppError::Unavailable(e) => tracing::error!(error = %e, "database unavailable"),
            AppError::Database(e) => tracing::error!(error = %e, "database error"),
            AppError::Internal(e) => tracing::error!(error = %e, "internal error"),
            AppError::InvalidCredentials | AppError::NotAuthenticated => {
                tracing::warn!(error = %self, "authentication failed")
            }
            _ => tracing::debug!(error = %self, "request rejected"),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found"),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AppError::Unavailable(err),
            other => AppError::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_client_errors() {
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotAuthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InactiveAccount.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InsufficientPrivilege.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("User not found").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn connection_failures_become_unavailable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Unavailable(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));

        let err = AppError::from(sqlx::Error::Protocol("boom".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unauthorized_response_carries_bearer_challenge() {
        let res = AppError::InvalidCredentials.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["detail"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let res = AppError::Internal(anyhow::anyhow!("secret path /etc/x")).into_response();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["detail"], "Internal server error");
    }
}

use serde::Deserialize;

/// OAuth2 password-grant form. `username` carries the email address;
/// `grant_type`, `scope` and client fields are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

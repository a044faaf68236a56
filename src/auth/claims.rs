use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,  // user ID
    pub exp: i64,   // expires at (unix timestamp)
    pub iat: i64,   // issued at (unix timestamp)
    pub jti: Uuid,  // unique per issued token
}

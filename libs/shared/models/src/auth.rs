use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserRole;

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: Uuid,
    pub phone_number: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller attached to the request by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub phone_number: String,
    pub role: UserRole,
}

impl From<JwtClaims> for AuthUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            id: claims.user_id,
            phone_number: claims.phone_number,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, TokenPair};
use shared_models::error::AppError;
use shared_models::user::User;

fn sign(user: &User, secret: &str, ttl_days: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = JwtClaims {
        user_id: user.id,
        phone_number: user.phone_number.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

pub fn sign_access_token(user: &User, config: &AppConfig) -> Result<String, AppError> {
    sign(user, &config.jwt_access_secret, config.access_token_ttl_days)
}

pub fn sign_refresh_token(user: &User, config: &AppConfig) -> Result<String, AppError> {
    sign(user, &config.jwt_refresh_secret, config.refresh_token_ttl_days)
}

/// Access/refresh pair bound to the user identity.
pub fn issue_token_pair(user: &User, config: &AppConfig) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: sign_access_token(user, config)?,
        refresh_token: sign_refresh_token(user, config)?,
    })
}

/// Verify signature and expiry; expiry checking comes from the default
/// validation, so an expired token never yields claims.
pub fn verify_token(token: &str, secret: &str) -> Result<JwtClaims, String> {
    if secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

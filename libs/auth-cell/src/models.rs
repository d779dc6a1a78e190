use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::auth::TokenPair;
use shared_models::error::{AppError, ErrorMessage};
use shared_models::user::{UserRole, UserSummary};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub phone_number: String,
    pub password: String,
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendOtpRequest {
    pub phone_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub phone_number: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

impl LoginResponse {
    pub fn new(tokens: TokenPair, user: UserSummary) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No user found for this phone number")]
    UserNotFound,

    #[error("An account already exists for this phone number")]
    PhoneAlreadyRegistered,

    #[error("Phone number or password is incorrect")]
    InvalidCredentials,

    #[error("This account is currently deactivated, contact support")]
    AccountDeactivated,

    #[error("Phone number is not verified yet")]
    PhoneNotVerified,

    #[error("The OTP code is not correct")]
    InvalidOtp,

    #[error("The OTP code has expired, request a new one")]
    OtpExpired,

    #[error("Password must be at least 8 characters with upper, lower, digit and special characters")]
    WeakPassword,

    #[error("Phone number format is invalid")]
    InvalidPhoneNumber,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::UserNotFound => AppError::NotFound(message),
            AuthError::PhoneAlreadyRegistered => AppError::Conflict(message),
            AuthError::InvalidCredentials
            | AuthError::InvalidOtp
            | AuthError::OtpExpired => AppError::BadRequest(message),
            AuthError::AccountDeactivated => AppError::Forbidden(message),
            AuthError::PhoneNotVerified | AuthError::InvalidRefreshToken => {
                AppError::Unauthorized(message)
            }
            AuthError::WeakPassword => {
                AppError::Validation(vec![ErrorMessage::new("password", message)])
            }
            AuthError::InvalidPhoneNumber => {
                AppError::Validation(vec![ErrorMessage::new("phone_number", message)])
            }
            AuthError::Internal(_) => AppError::Internal(message),
        }
    }
}

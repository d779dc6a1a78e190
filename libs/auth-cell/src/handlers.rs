use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use shared_models::auth::{AuthUser, TokenPair};
use shared_models::error::AppError;
use shared_models::response::ApiResponse;
use shared_models::user::UserSummary;

use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, SendOtpRequest, VerifyOtpRequest,
};
use crate::router::AuthState;

pub async fn register(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, AppError> {
    let user = state.auth_service.register(request).await?;
    Ok(Json(ApiResponse::ok(
        "Registration successful, please verify your phone number",
        user,
    )))
}

pub async fn verify_otp(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .auth_service
        .verify_otp(&request.phone_number, &request.otp)
        .await?;
    Ok(Json(ApiResponse::ok("Phone number verified successfully", ())))
}

pub async fn login(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(ApiResponse::ok("Login successful", response)))
}

pub async fn send_otp(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth_service.send_otp(&request.phone_number).await?;
    Ok(Json(ApiResponse::ok("OTP sent successfully", ())))
}

pub async fn reset_password(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth_service.reset_password(request).await?;
    Ok(Json(ApiResponse::ok("Password reset successfully", ())))
}

pub async fn refresh_token(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = state
        .auth_service
        .refresh_token(&request.refresh_token)
        .await?;
    Ok(Json(ApiResponse::ok("Token refreshed successfully", tokens)))
}

pub async fn change_password(
    State(state): State<Arc<AuthState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth_service.change_password(user.id, request).await?;
    Ok(Json(ApiResponse::ok("Password changed successfully", ())))
}

pub async fn logout(
    State(state): State<Arc<AuthState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth_service.logout(user.id).await?;
    Ok(Json(ApiResponse::ok("Logged out successfully", ())))
}

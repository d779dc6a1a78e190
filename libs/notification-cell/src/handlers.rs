use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::notification::DeviceToken;
use shared_models::response::ApiResponse;

use crate::models::RegisterDeviceTokenRequest;
use crate::router::NotificationState;

pub async fn register_device_token(
    State(state): State<Arc<NotificationState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RegisterDeviceTokenRequest>,
) -> Result<Json<ApiResponse<DeviceToken>>, AppError> {
    let token = state
        .notifier
        .register_device_token(user.id, request)
        .await?;

    Ok(Json(ApiResponse::ok(
        "Device token registered successfully",
        token,
    )))
}

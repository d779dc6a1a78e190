use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::membership::{Membership, Schedule};
use shared_models::response::ApiResponse;

use crate::models::{
    CreateMembershipRequest, MembershipQuery, MembershipWithSchedules, ScheduleRequest,
    UpdateMembershipRequest,
};
use crate::router::MembershipState;

pub async fn create_membership(
    State(state): State<Arc<MembershipState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateMembershipRequest>,
) -> Result<Json<ApiResponse<Membership>>, AppError> {
    let membership = state
        .membership_service
        .create_membership(&user, request)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Membership created successfully",
        membership,
    )))
}

pub async fn list_memberships(
    State(state): State<Arc<MembershipState>>,
    Query(query): Query<MembershipQuery>,
) -> Result<Json<ApiResponse<Vec<MembershipWithSchedules>>>, AppError> {
    let (memberships, meta) = state.membership_service.list_memberships(query).await?;
    Ok(Json(
        ApiResponse::ok("Memberships retrieved successfully", memberships).with_meta(meta),
    ))
}

pub async fn update_membership(
    State(state): State<Arc<MembershipState>>,
    Extension(user): Extension<AuthUser>,
    Path(membership_id): Path<Uuid>,
    Json(request): Json<UpdateMembershipRequest>,
) -> Result<Json<ApiResponse<Membership>>, AppError> {
    let membership = state
        .membership_service
        .update_membership(&user, membership_id, request)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Membership updated successfully",
        membership,
    )))
}

pub async fn delete_membership(
    State(state): State<Arc<MembershipState>>,
    Extension(user): Extension<AuthUser>,
    Path(membership_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .membership_service
        .delete_membership(&user, membership_id)
        .await?;
    Ok(Json(ApiResponse::ok("Membership deleted successfully", ())))
}

pub async fn add_schedule(
    State(state): State<Arc<MembershipState>>,
    Extension(user): Extension<AuthUser>,
    Path(membership_id): Path<Uuid>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    let schedule = state
        .membership_service
        .add_schedule(&user, membership_id, request)
        .await?;
    Ok(Json(ApiResponse::ok("Schedule added successfully", schedule)))
}

pub async fn delete_schedule(
    State(state): State<Arc<MembershipState>>,
    Extension(user): Extension<AuthUser>,
    Path(schedule_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .membership_service
        .delete_schedule(&user, schedule_id)
        .await?;
    Ok(Json(ApiResponse::ok("Schedule deleted successfully", ())))
}

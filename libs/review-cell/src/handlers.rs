use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::ApiResponse;
use shared_models::review::{Review, ReviewReply, ReviewTargetType};

use crate::models::{
    CreateReviewRequest, ReplyRequest, ReviewQuery, ReviewStats, ReviewWithReply,
    UpdateReviewRequest,
};
use crate::router::ReviewState;

fn parse_target_type(raw: &str) -> Result<ReviewTargetType, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("unknown review target: {}", raw)))
}

pub async fn create_review(
    State(state): State<Arc<ReviewState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = state.review_service.create_review(&user, request).await?;
    Ok(Json(ApiResponse::ok("Review submitted successfully", review)))
}

pub async fn get_my_reviews(
    State(state): State<Arc<ReviewState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewWithReply>>>, AppError> {
    let (reviews, meta) = state.review_service.get_my_reviews(&user, query).await?;
    Ok(Json(
        ApiResponse::ok("Reviews retrieved successfully", reviews).with_meta(meta),
    ))
}

pub async fn update_review(
    State(state): State<Arc<ReviewState>>,
    Extension(user): Extension<AuthUser>,
    Path(review_id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = state
        .review_service
        .update_review(&user, review_id, request)
        .await?;
    Ok(Json(ApiResponse::ok("Review updated successfully", review)))
}

pub async fn delete_review(
    State(state): State<Arc<ReviewState>>,
    Extension(user): Extension<AuthUser>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.review_service.delete_review(&user, review_id).await?;
    Ok(Json(ApiResponse::ok("Review deleted successfully", ())))
}

pub async fn reply_to_review(
    State(state): State<Arc<ReviewState>>,
    Extension(user): Extension<AuthUser>,
    Path(review_id): Path<Uuid>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<ApiResponse<ReviewReply>>, AppError> {
    let reply = state
        .review_service
        .reply_to_review(&user, review_id, request)
        .await?;
    Ok(Json(ApiResponse::ok("Reply saved successfully", reply)))
}

pub async fn get_reviews_for_target(
    State(state): State<Arc<ReviewState>>,
    Path((target_type, target_id)): Path<(String, Uuid)>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewWithReply>>>, AppError> {
    let target_type = parse_target_type(&target_type)?;
    let (reviews, meta) = state
        .review_service
        .get_reviews_for_target(target_id, target_type, query)
        .await?;
    Ok(Json(
        ApiResponse::ok("Reviews retrieved successfully", reviews).with_meta(meta),
    ))
}

pub async fn get_review_stats(
    State(state): State<Arc<ReviewState>>,
    Path((target_type, target_id)): Path<(String, Uuid)>,
) -> Result<Json<ApiResponse<ReviewStats>>, AppError> {
    let target_type = parse_target_type(&target_type)?;
    let stats = state
        .review_service
        .get_review_stats(target_id, target_type)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Review stats retrieved successfully",
        stats,
    )))
}

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::{AppError, ErrorMessage};
use shared_models::review::{Review, ReviewReply, ReviewStatus, ReviewTargetType};
use shared_utils::pagination::{PageOptions, SortOrder};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub target_id: Uuid,
    pub target_type: ReviewTargetType,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<ReviewStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_order: Option<SortOrder>,
}

impl ReviewQuery {
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            page: self.page,
            limit: self.limit,
            sort_by: None,
            sort_order: self.sort_order,
        }
    }
}

/// A review together with the target's reply, when one exists.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithReply {
    #[serde(flatten)]
    pub review: Review,
    pub reply: Option<ReviewReply>,
}

/// Aggregate block for a target's profile. The average covers approved
/// reviews only; the breakdowns cover everything.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub average_rating: f64,
    pub reviews_count: i64,
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
    /// Counts for ratings 1 through 5, in order.
    pub distribution: [i64; 5],
    pub replies_count: i64,
    /// Share of reviews that carry a reply, 0.0 when there are none.
    pub reply_rate: f64,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Only patients can leave reviews")]
    NotPatient,
    #[error("Patients cannot access the review management listing")]
    PatientListing,
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("{0} not found")]
    TargetNotFound(ReviewTargetType),
    #[error("You have already reviewed this {0}")]
    DuplicateReview(ReviewTargetType),
    #[error("Review not found")]
    ReviewNotFound,
    #[error("You are not allowed to modify this review")]
    NotOwner,
    #[error("Only the reviewed party can reply to a review")]
    NotTargetOwner,
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotPatient
            | ReviewError::PatientListing
            | ReviewError::NotOwner
            | ReviewError::NotTargetOwner => AppError::Forbidden(err.to_string()),
            ReviewError::InvalidRating => {
                AppError::Validation(vec![ErrorMessage::new("rating", err.to_string())])
            }
            ReviewError::TargetNotFound(_) | ReviewError::ReviewNotFound => {
                AppError::NotFound(err.to_string())
            }
            ReviewError::DuplicateReview(_) => AppError::Conflict(err.to_string()),
        }
    }
}

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::response::Meta;
use shared_models::review::{Review, ReviewReply, ReviewStatus, ReviewTargetType};
use shared_models::user::UserRole;
use shared_store::Store;
use shared_utils::pagination::calculate;

use crate::models::{
    CreateReviewRequest, ReplyRequest, ReviewError, ReviewQuery, ReviewStats, ReviewWithReply,
    UpdateReviewRequest,
};

pub struct ReviewService {
    store: Arc<Store>,
}

impl ReviewService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// One review per (patient, target). The target's aggregate rating is
    /// refreshed in the same transaction, so it never lags the review rows.
    pub async fn create_review(
        &self,
        user: &AuthUser,
        request: CreateReviewRequest,
    ) -> Result<Review, ReviewError> {
        if user.role != UserRole::Patient {
            return Err(ReviewError::NotPatient);
        }
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::InvalidRating);
        }

        let reviewer_id = user.id;

        let review = self
            .store
            .transaction(|state| {
                let target_exists = match request.target_type {
                    ReviewTargetType::Doctor => state.doctors.contains_key(&request.target_id),
                    ReviewTargetType::Clinic => state.clinics.contains_key(&request.target_id),
                };
                if !target_exists {
                    return Err(ReviewError::TargetNotFound(request.target_type));
                }

                if state.review_for_pair(reviewer_id, request.target_id).is_some() {
                    return Err(ReviewError::DuplicateReview(request.target_type));
                }

                let now = Utc::now();
                let review = Review {
                    id: Uuid::new_v4(),
                    reviewer_id,
                    target_id: request.target_id,
                    target_type: request.target_type,
                    rating: request.rating,
                    comment: request.comment.clone(),
                    status: ReviewStatus::Approved,
                    created_at: now,
                    updated_at: now,
                };
                state.reviews.insert(review.id, review.clone());
                state.recompute_target_rating(request.target_id, request.target_type);
                Ok(review)
            })
            .await?;

        info!(
            "Review {} created for {} {}",
            review.id, review.target_type, review.target_id
        );
        Ok(review)
    }

    pub async fn update_review(
        &self,
        user: &AuthUser,
        review_id: Uuid,
        request: UpdateReviewRequest,
    ) -> Result<Review, ReviewError> {
        if let Some(rating) = request.rating {
            if !(1..=5).contains(&rating) {
                return Err(ReviewError::InvalidRating);
            }
        }

        let user_id = user.id;
        let is_admin = user.role == UserRole::Admin;

        self.store
            .transaction(|state| {
                let row = state
                    .reviews
                    .get_mut(&review_id)
                    .ok_or(ReviewError::ReviewNotFound)?;
                if row.reviewer_id != user_id && !is_admin {
                    return Err(ReviewError::NotOwner);
                }

                if let Some(rating) = request.rating {
                    row.rating = rating;
                }
                if let Some(comment) = &request.comment {
                    row.comment = Some(comment.clone());
                }
                row.updated_at = Utc::now();

                let (target_id, target_type) = (row.target_id, row.target_type);
                let review = row.clone();
                state.recompute_target_rating(target_id, target_type);
                Ok(review)
            })
            .await
    }

    /// Remove a review and its reply; the aggregate rating drops back to
    /// zero when it was the last one.
    pub async fn delete_review(&self, user: &AuthUser, review_id: Uuid) -> Result<(), ReviewError> {
        let user_id = user.id;
        let is_admin = user.role == UserRole::Admin;

        self.store
            .transaction(|state| {
                let review = state
                    .reviews
                    .get(&review_id)
                    .cloned()
                    .ok_or(ReviewError::ReviewNotFound)?;
                if review.reviewer_id != user_id && !is_admin {
                    return Err(ReviewError::NotOwner);
                }

                state.reviews.remove(&review_id);
                state.review_replies.remove(&review_id);
                state.recompute_target_rating(review.target_id, review.target_type);
                Ok(())
            })
            .await
    }

    /// Upsert the single reply a reviewed doctor or clinic may leave.
    pub async fn reply_to_review(
        &self,
        user: &AuthUser,
        review_id: Uuid,
        request: ReplyRequest,
    ) -> Result<ReviewReply, ReviewError> {
        let user_id = user.id;
        let is_admin = user.role == UserRole::Admin;

        self.store
            .transaction(|state| {
                let review = state
                    .reviews
                    .get(&review_id)
                    .ok_or(ReviewError::ReviewNotFound)?;
                if review.target_id != user_id && !is_admin {
                    return Err(ReviewError::NotTargetOwner);
                }

                let now = Utc::now();
                let reply = state
                    .review_replies
                    .entry(review_id)
                    .and_modify(|reply| {
                        reply.content = request.content.clone();
                        reply.updated_at = now;
                    })
                    .or_insert_with(|| ReviewReply {
                        id: Uuid::new_v4(),
                        review_id,
                        replied_by_id: user_id,
                        content: request.content.clone(),
                        created_at: now,
                        updated_at: now,
                    });
                Ok(reply.clone())
            })
            .await
    }

    /// Management listing for doctor and clinic dashboards: locked to
    /// reviews about the caller, admins see everything. Patients use the
    /// public per-target listing instead.
    pub async fn get_my_reviews(
        &self,
        user: &AuthUser,
        query: ReviewQuery,
    ) -> Result<(Vec<ReviewWithReply>, Meta), ReviewError> {
        let user_id = user.id;
        let role = user.role;
        if role == UserRole::Patient {
            return Err(ReviewError::PatientListing);
        }

        let result = self
            .store
            .read(|state| {
                let scoped: Vec<Review> = state
                    .reviews
                    .values()
                    .filter(|r| role == UserRole::Admin || r.target_id == user_id)
                    .filter(|r| query.status.map_or(true, |s| r.status == s))
                    .cloned()
                    .collect();

                paginate(state, scoped, &query)
            })
            .await;

        Ok(result)
    }

    /// Public listing for a doctor or clinic profile page. Approved reviews
    /// unless the caller asks for another status.
    pub async fn get_reviews_for_target(
        &self,
        target_id: Uuid,
        target_type: ReviewTargetType,
        query: ReviewQuery,
    ) -> Result<(Vec<ReviewWithReply>, Meta), ReviewError> {
        let status = query.status.unwrap_or(ReviewStatus::Approved);
        let result = self
            .store
            .read(|state| {
                let scoped = state.reviews_for_target(target_id, target_type, status);
                paginate(state, scoped, &query)
            })
            .await;

        Ok(result)
    }

    pub async fn get_review_stats(
        &self,
        target_id: Uuid,
        target_type: ReviewTargetType,
    ) -> Result<ReviewStats, ReviewError> {
        let stats = self
            .store
            .read(|state| {
                let (average_rating, reviews_count) =
                    state.rating_aggregate(target_id, target_type);

                let mut total = 0i64;
                let mut by_status = (0i64, 0i64, 0i64);
                let mut distribution = [0i64; 5];
                let mut replies_count = 0i64;
                for review in state
                    .reviews
                    .values()
                    .filter(|r| r.target_id == target_id && r.target_type == target_type)
                {
                    total += 1;
                    match review.status {
                        ReviewStatus::Approved => by_status.0 += 1,
                        ReviewStatus::Pending => by_status.1 += 1,
                        ReviewStatus::Rejected => by_status.2 += 1,
                    }
                    if (1..=5).contains(&review.rating) {
                        distribution[(review.rating - 1) as usize] += 1;
                    }
                    if state.review_replies.contains_key(&review.id) {
                        replies_count += 1;
                    }
                }

                let reply_rate = if total > 0 {
                    replies_count as f64 / total as f64
                } else {
                    0.0
                };

                ReviewStats {
                    average_rating,
                    reviews_count,
                    total,
                    approved: by_status.0,
                    pending: by_status.1,
                    rejected: by_status.2,
                    distribution,
                    replies_count,
                    reply_rate,
                }
            })
            .await;

        Ok(stats)
    }
}

fn paginate(
    state: &shared_store::StoreState,
    mut reviews: Vec<Review>,
    query: &ReviewQuery,
) -> (Vec<ReviewWithReply>, Meta) {
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = reviews.len() as i64;
    let window = calculate(&query.page_options());
    let page = reviews
        .into_iter()
        .skip(window.skip)
        .take(window.limit as usize)
        .map(|review| ReviewWithReply {
            reply: state.review_replies.get(&review.id).cloned(),
            review,
        })
        .collect();

    (page, Meta::new(window.page, window.limit, total))
}

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::review::ReviewService;

pub struct ReviewState {
    pub config: Arc<AppConfig>,
    pub review_service: Arc<ReviewService>,
}

pub fn review_routes(state: Arc<ReviewState>) -> Router {
    let protected = Router::new()
        .route("/", post(handlers::create_review))
        .route("/", get(handlers::get_my_reviews))
        .route("/{id}", patch(handlers::update_review))
        .route("/{id}", delete(handlers::delete_review))
        .route("/{id}/reply", post(handlers::reply_to_review))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/target/{type}/{id}", get(handlers::get_reviews_for_target))
        .route(
            "/target/{type}/{id}/stats",
            get(handlers::get_review_stats),
        )
        .merge(protected)
        .with_state(state)
}

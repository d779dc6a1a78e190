use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::membership::MembershipService;

pub struct MembershipState {
    pub config: Arc<AppConfig>,
    pub membership_service: Arc<MembershipService>,
}

pub fn membership_routes(state: Arc<MembershipState>) -> Router {
    let protected = Router::new()
        .route("/", post(handlers::create_membership))
        .route("/{id}", patch(handlers::update_membership))
        .route("/{id}", delete(handlers::delete_membership))
        .route("/{id}/schedules", post(handlers::add_schedule))
        .route("/schedules/{id}", delete(handlers::delete_schedule))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::list_memberships))
        .merge(protected)
        .with_state(state)
}

use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::notifier::Notifier;

pub struct NotificationState {
    pub config: Arc<AppConfig>,
    pub notifier: Arc<Notifier>,
}

pub fn notification_routes(state: Arc<NotificationState>) -> Router {
    Router::new()
        .route("/device-token", post(handlers::register_device_token))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

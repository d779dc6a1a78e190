use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::auth::AuthService;

pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub auth_service: Arc<AuthService>,
}

pub fn auth_routes(state: Arc<AuthState>) -> Router {
    let protected = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/change-password", post(handlers::change_password))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/verify-otp", post(handlers::verify_otp))
        .route("/login", post(handlers::login))
        .route("/send-otp", post(handlers::send_otp))
        .route("/reset-password", post(handlers::reset_password))
        .route("/refresh-token", post(handlers::refresh_token))
        .merge(protected)
        .with_state(state)
}

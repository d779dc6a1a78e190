use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::booking::BookingService;

pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub booking_service: Arc<BookingService>,
}

pub fn appointment_routes(state: Arc<AppointmentState>) -> Router {
    let protected = Router::new()
        .route("/logged", post(handlers::book_as_registered))
        .route("/", get(handlers::get_my_appointments))
        .route("/{id}", patch(handlers::update_appointment))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", post(handlers::book_as_guest))
        .route("/send-otp", post(handlers::send_booking_otp))
        .merge(protected)
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::{appointment_routes, AppointmentState};
use appointment_cell::services::booking::BookingService;
use auth_cell::router::{auth_routes, AuthState};
use auth_cell::services::auth::AuthService;
use membership_cell::router::{membership_routes, MembershipState};
use membership_cell::services::membership::MembershipService;
use notification_cell::router::{notification_routes, NotificationState};
use notification_cell::services::notifier::Notifier;
use review_cell::router::{review_routes, ReviewState};
use review_cell::services::review::ReviewService;
use shared_config::AppConfig;
use shared_store::Store;

pub fn create_router(
    config: Arc<AppConfig>,
    store: Arc<Store>,
    notifier: Arc<Notifier>,
) -> Router {
    let auth_state = Arc::new(AuthState {
        config: config.clone(),
        auth_service: Arc::new(AuthService::new(store.clone(), config.clone())),
    });
    let appointment_state = Arc::new(AppointmentState {
        config: config.clone(),
        booking_service: Arc::new(BookingService::new(
            store.clone(),
            config.clone(),
            notifier.clone(),
        )),
    });
    let review_state = Arc::new(ReviewState {
        config: config.clone(),
        review_service: Arc::new(ReviewService::new(store.clone())),
    });
    let membership_state = Arc::new(MembershipState {
        config: config.clone(),
        membership_service: Arc::new(MembershipService::new(store.clone())),
    });
    let notification_state = Arc::new(NotificationState {
        config: config.clone(),
        notifier,
    });

    let api = Router::new()
        .nest("/auth", auth_routes(auth_state))
        .nest("/appointments", appointment_routes(appointment_state))
        .nest("/reviews", review_routes(review_state))
        .nest("/memberships", membership_routes(membership_state))
        .nest("/notifications", notification_routes(notification_state));

    Router::new()
        .route("/", get(|| async { "Nirog Care API is running!" }))
        .nest("/api/v1", api)
}

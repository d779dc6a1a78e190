use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use shared_models::appointment::Appointment;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::ApiResponse;

use crate::models::{
    AppointmentQuery, BookingAuthResponse, GuestBookingRequest, RegisteredBookingRequest,
    SendBookingOtpRequest, UpdateAppointmentRequest,
};
use crate::router::AppointmentState;

pub async fn send_booking_otp(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<SendBookingOtpRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .booking_service
        .send_booking_otp(&request.phone_number)
        .await?;
    Ok(Json(ApiResponse::ok("OTP sent successfully", ())))
}

pub async fn book_as_guest(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<GuestBookingRequest>,
) -> Result<Json<ApiResponse<BookingAuthResponse>>, AppError> {
    let response = state.booking_service.book_as_guest(request).await?;
    Ok(Json(ApiResponse::ok(
        "Appointment booked successfully",
        response,
    )))
}

pub async fn book_as_registered(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RegisteredBookingRequest>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = state
        .booking_service
        .book_as_registered(&user, request)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Appointment booked successfully",
        appointment,
    )))
}

pub async fn get_my_appointments(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, AppError> {
    let (appointments, meta, stats) = state
        .booking_service
        .get_my_appointments(&user, query)
        .await?;
    Ok(Json(
        ApiResponse::ok("Appointments retrieved successfully", appointments)
            .with_meta(meta)
            .with_stats(stats),
    ))
}

pub async fn update_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = state
        .booking_service
        .update_appointment(&user, appointment_id, request)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Appointment updated successfully",
        appointment,
    )))
}

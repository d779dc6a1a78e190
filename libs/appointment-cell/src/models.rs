use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::error::{AppError, ErrorMessage};
use shared_models::user::UserSummary;
use shared_utils::pagination::{PageOptions, SortOrder};

#[derive(Debug, Clone, Deserialize)]
pub struct SendBookingOtpRequest {
    pub phone_number: String,
}

/// Unauthenticated booking payload. The OTP proves phone ownership and the
/// whole request is settled in one transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestBookingRequest {
    pub patient_name: String,
    pub patient_age: Option<String>,
    pub phone_number: String,
    pub address: Option<String>,
    pub note: Option<String>,
    pub appointment_date: NaiveDate,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub otp: String,
}

/// Booking payload for an already authenticated patient. Contact fields
/// default to the account values when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredBookingRequest {
    pub patient_name: Option<String>,
    pub patient_age: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub appointment_date: NaiveDate,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
}

/// Guest booking response: the appointment plus a signed-in session for the
/// resolved account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAuthResponse {
    pub appointment: Appointment,
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<AppointmentStatus>,
    /// Narrow the listing to one calendar day.
    pub date: Option<NaiveDate>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_order: Option<SortOrder>,
}

impl AppointmentQuery {
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            page: self.page,
            limit: self.limit,
            sort_by: None,
            sort_order: self.sort_order,
        }
    }
}

/// Role-scoped counters returned alongside every appointment listing.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct AppointmentStats {
    pub total: i64,
    pub scheduled: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub appointment_date: Option<NaiveDate>,
    pub note: Option<String>,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("This phone number already has an account, please log in to book")]
    FullyRegisteredPhone,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("OTP has expired, please request a new one")]
    OtpExpired,
    #[error("Invalid phone number format")]
    InvalidPhoneNumber,
    #[error("Doctor not found")]
    DoctorNotFound,
    #[error("Clinic not found")]
    ClinicNotFound,
    #[error("You already have an appointment with this doctor on this date")]
    DuplicateBooking,
    #[error("Only patients can book appointments")]
    NotPatient,
    #[error("Appointment not found")]
    AppointmentNotFound,
    #[error("You are not allowed to modify this appointment")]
    NotAllowed,
    #[error("A {0} appointment can no longer be updated")]
    TerminalStatus(AppointmentStatus),
    #[error("{0}")]
    Internal(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::FullyRegisteredPhone
            | BookingError::NotPatient
            | BookingError::NotAllowed => AppError::Forbidden(err.to_string()),
            BookingError::InvalidOtp
            | BookingError::OtpExpired
            | BookingError::TerminalStatus(_) => AppError::BadRequest(err.to_string()),
            BookingError::InvalidPhoneNumber => AppError::Validation(vec![ErrorMessage::new(
                "phone_number",
                err.to_string(),
            )]),
            BookingError::DoctorNotFound
            | BookingError::ClinicNotFound
            | BookingError::AppointmentNotFound => AppError::NotFound(err.to_string()),
            BookingError::DuplicateBooking => AppError::Conflict(err.to_string()),
            BookingError::Internal(message) => AppError::Internal(message),
        }
    }
}

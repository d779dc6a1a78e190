use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl AppointmentStatus {
    /// Completed and cancelled appointments accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "PENDING"),
            AppointmentStatus::Scheduled => write!(f, "SCHEDULED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
            AppointmentStatus::Rescheduled => write!(f, "RESCHEDULED"),
        }
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(AppointmentStatus::Pending),
            "SCHEDULED" => Ok(AppointmentStatus::Scheduled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            "RESCHEDULED" => Ok(AppointmentStatus::Rescheduled),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

/// The central transactional entity. Never hard-deleted; cancellation is a
/// status change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    /// Short uppercase alphanumeric booking reference shown to the patient.
    pub code: String,
    /// Insertion order within the store, used as the default queue position.
    pub serial_number: i64,
    pub appointment_date: NaiveDate,
    pub status: AppointmentStatus,
    // Denormalized guest fields kept as fallback display data.
    pub patient_name: String,
    pub patient_age: Option<String>,
    pub phone_number: String,
    pub address: Option<String>,
    pub note: Option<String>,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One-time password keyed by phone number, consumed by the guest booking
/// flow. Auth flows embed OTP fields on the user row instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OtpRecord {
    pub phone_number: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

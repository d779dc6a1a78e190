use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::{AppError, ErrorMessage};
use shared_models::membership::{DayOfWeek, Membership, Schedule};
use shared_utils::pagination::{PageOptions, SortOrder};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMembershipRequest {
    pub doctor_id: Uuid,
    pub fee: f64,
    pub discount: Option<f64>,
    pub max_appointments: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMembershipRequest {
    pub fee: Option<f64>,
    pub discount: Option<f64>,
    pub max_appointments: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub days: Vec<DayOfWeek>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipQuery {
    pub doctor_id: Option<Uuid>,
    pub clinic_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_order: Option<SortOrder>,
}

impl MembershipQuery {
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            page: self.page,
            limit: self.limit,
            sort_by: None,
            sort_order: self.sort_order,
        }
    }
}

/// Membership with its consultation hours, as listed publicly.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MembershipWithSchedules {
    #[serde(flatten)]
    pub membership: Membership,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("Only clinics can manage memberships")]
    NotClinic,
    #[error("Doctor not found")]
    DoctorNotFound,
    #[error("Membership not found")]
    MembershipNotFound,
    #[error("Schedule not found")]
    ScheduleNotFound,
    #[error("This doctor already has a membership at this clinic")]
    DuplicateMembership,
    #[error("You are not allowed to modify this membership")]
    NotOwner,
    #[error("Schedule must end after it starts")]
    InvalidTimeRange,
    #[error("Schedule needs at least one day")]
    EmptyDays,
}

impl From<MembershipError> for AppError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::NotClinic | MembershipError::NotOwner => {
                AppError::Forbidden(err.to_string())
            }
            MembershipError::DoctorNotFound
            | MembershipError::MembershipNotFound
            | MembershipError::ScheduleNotFound => AppError::NotFound(err.to_string()),
            MembershipError::DuplicateMembership => AppError::Conflict(err.to_string()),
            MembershipError::InvalidTimeRange => {
                AppError::Validation(vec![ErrorMessage::new("end_time", err.to_string())])
            }
            MembershipError::EmptyDays => {
                AppError::Validation(vec![ErrorMessage::new("days", err.to_string())])
            }
        }
    }
}

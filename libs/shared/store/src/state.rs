use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus, OtpRecord};
use shared_models::membership::{Membership, Schedule};
use shared_models::notification::DeviceToken;
use shared_models::review::{Review, ReviewReply, ReviewStatus, ReviewTargetType};
use shared_models::user::{ClinicProfile, DoctorProfile, PatientProfile, User};

/// All tables. Cloned wholesale to snapshot a transaction; row counts here
/// are clinic-scale, not warehouse-scale.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub users: HashMap<Uuid, User>,
    /// Role profiles, keyed by the owning user id (1:1).
    pub patients: HashMap<Uuid, PatientProfile>,
    pub doctors: HashMap<Uuid, DoctorProfile>,
    pub clinics: HashMap<Uuid, ClinicProfile>,
    pub appointments: HashMap<Uuid, Appointment>,
    /// Guest-booking OTPs, keyed by phone number (upsert on issue).
    pub otps: HashMap<String, OtpRecord>,
    pub memberships: HashMap<Uuid, Membership>,
    pub schedules: HashMap<Uuid, Schedule>,
    pub reviews: HashMap<Uuid, Review>,
    /// Keyed by review id (at most one reply per review).
    pub review_replies: HashMap<Uuid, ReviewReply>,
    /// Keyed by the token string.
    pub device_tokens: HashMap<String, DeviceToken>,
    next_serial: i64,
}

impl StoreState {
    // ---------------------------------------------------------------- users

    pub fn find_user_by_phone(&self, phone_number: &str) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.phone_number == phone_number)
    }

    pub fn find_user_by_phone_mut(&mut self, phone_number: &str) -> Option<&mut User> {
        self.users
            .values_mut()
            .find(|u| u.phone_number == phone_number)
    }

    // --------------------------------------------------------- appointments

    /// Insert an appointment, assigning the next serial number.
    pub fn insert_appointment(&mut self, mut appointment: Appointment) -> Appointment {
        self.next_serial += 1;
        appointment.serial_number = self.next_serial;
        self.appointments
            .insert(appointment.id, appointment.clone());
        appointment
    }

    /// Any non-cancelled appointment for the same patient/doctor/day.
    pub fn conflicting_appointment(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        day: NaiveDate,
    ) -> Option<&Appointment> {
        self.appointments.values().find(|a| {
            a.patient_id == patient_id
                && a.doctor_id == doctor_id
                && a.appointment_date == day
                && a.status != AppointmentStatus::Cancelled
        })
    }

    // ---------------------------------------------------------- memberships

    pub fn membership_for_pair(&self, doctor_id: Uuid, clinic_id: Uuid) -> Option<&Membership> {
        self.memberships
            .values()
            .find(|m| m.doctor_id == doctor_id && m.clinic_id == clinic_id)
    }

    pub fn schedules_for_membership(&self, membership_id: Uuid) -> Vec<Schedule> {
        let mut schedules: Vec<Schedule> = self
            .schedules
            .values()
            .filter(|s| s.membership_id == membership_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.created_at);
        schedules
    }

    // -------------------------------------------------------------- reviews

    pub fn review_for_pair(&self, reviewer_id: Uuid, target_id: Uuid) -> Option<&Review> {
        self.reviews
            .values()
            .find(|r| r.reviewer_id == reviewer_id && r.target_id == target_id)
    }

    /// Full aggregate scan over the target's approved reviews.
    pub fn rating_aggregate(&self, target_id: Uuid, target_type: ReviewTargetType) -> (f64, i64) {
        let ratings: Vec<u8> = self
            .reviews
            .values()
            .filter(|r| {
                r.target_id == target_id
                    && r.target_type == target_type
                    && r.status == ReviewStatus::Approved
            })
            .map(|r| r.rating)
            .collect();

        if ratings.is_empty() {
            return (0.0, 0);
        }
        let count = ratings.len() as i64;
        let average = ratings.iter().map(|&r| r as f64).sum::<f64>() / count as f64;
        (average, count)
    }

    /// Recompute and persist the target's aggregate rating. Called inside the
    /// same transaction as every review mutation.
    pub fn recompute_target_rating(&mut self, target_id: Uuid, target_type: ReviewTargetType) {
        let (average, count) = self.rating_aggregate(target_id, target_type);
        let now = Utc::now();

        match target_type {
            ReviewTargetType::Doctor => {
                if let Some(doctor) = self.doctors.get_mut(&target_id) {
                    doctor.average_rating = average;
                    doctor.reviews_count = count;
                    doctor.updated_at = now;
                }
            }
            ReviewTargetType::Clinic => {
                if let Some(clinic) = self.clinics.get_mut(&target_id) {
                    clinic.average_rating = average;
                    clinic.reviews_count = count;
                    clinic.updated_at = now;
                }
            }
        }
    }

    pub fn reviews_for_target(
        &self,
        target_id: Uuid,
        target_type: ReviewTargetType,
        status: ReviewStatus,
    ) -> Vec<Review> {
        let mut reviews: Vec<Review> = self
            .reviews
            .values()
            .filter(|r| {
                r.target_id == target_id && r.target_type == target_type && r.status == status
            })
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }

    // ------------------------------------------------------- device tokens

    pub fn tokens_for_user(&self, user_id: Uuid) -> Vec<String> {
        self.device_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.token.clone())
            .collect()
    }
}

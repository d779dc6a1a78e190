use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use notification_cell::services::notifier::Notifier;
use shared_config::AppConfig;
use shared_models::appointment::{Appointment, AppointmentStatus, OtpRecord};
use shared_models::auth::AuthUser;
use shared_models::response::Meta;
use shared_models::user::{PatientProfile, User, UserRole};
use shared_store::Store;
use shared_utils::codes::{generate_booking_code, generate_otp_code};
use shared_utils::jwt::issue_token_pair;
use shared_utils::pagination::{calculate, SortOrder};
use shared_utils::password::{hash_password, is_valid_phone_number};

use crate::models::{
    AppointmentQuery, AppointmentStats, BookingAuthResponse, BookingError, GuestBookingRequest,
    RegisteredBookingRequest, UpdateAppointmentRequest,
};

const BOOKING_CODE_LENGTH: usize = 6;

pub struct BookingService {
    store: Arc<Store>,
    config: Arc<AppConfig>,
    notifier: Arc<Notifier>,
}

impl BookingService {
    pub fn new(store: Arc<Store>, config: Arc<AppConfig>, notifier: Arc<Notifier>) -> Self {
        Self {
            store,
            config,
            notifier,
        }
    }

    fn default_status(&self) -> AppointmentStatus {
        self.config
            .booking_default_status
            .parse()
            .unwrap_or(AppointmentStatus::Pending)
    }

    /// Issue a booking OTP for a guest phone number. A phone that belongs to
    /// a fully registered account must use the logged-in path instead.
    pub async fn send_booking_otp(&self, phone_number: &str) -> Result<(), BookingError> {
        if !is_valid_phone_number(phone_number) {
            return Err(BookingError::InvalidPhoneNumber);
        }

        let code = generate_otp_code();
        let expires_at = Utc::now() + Duration::minutes(self.config.booking_otp_ttl_minutes);
        let phone = phone_number.to_string();

        self.store
            .transaction(|state| {
                if let Some(user) = state.find_user_by_phone(&phone) {
                    if user.is_phone_verified && !user.is_default_password {
                        return Err(BookingError::FullyRegisteredPhone);
                    }
                }

                // Re-issuing replaces any earlier code for this phone.
                state.otps.insert(
                    phone.clone(),
                    OtpRecord {
                        phone_number: phone.clone(),
                        code: code.clone(),
                        expires_at,
                    },
                );
                Ok(())
            })
            .await?;

        debug!("Booking OTP for {}: {}", phone_number, code);
        Ok(())
    }

    /// Settle a guest booking in a single transaction: re-check the OTP,
    /// resolve or create the phone's account, reject same-day duplicates,
    /// create the appointment, consume the OTP and sign the account in.
    pub async fn book_as_guest(
        &self,
        request: GuestBookingRequest,
    ) -> Result<BookingAuthResponse, BookingError> {
        if !is_valid_phone_number(&request.phone_number) {
            return Err(BookingError::InvalidPhoneNumber);
        }

        let default_password_hash = hash_password(&self.config.guest_default_password)
            .map_err(|e| BookingError::Internal(e.to_string()))?;
        let config = Arc::clone(&self.config);
        let status = self.default_status();

        let response = self
            .store
            .transaction(|state| {
                let record = state
                    .otps
                    .get(&request.phone_number)
                    .cloned()
                    .ok_or(BookingError::InvalidOtp)?;
                if record.code != request.otp {
                    return Err(BookingError::InvalidOtp);
                }
                if Utc::now() > record.expires_at {
                    return Err(BookingError::OtpExpired);
                }

                if !state.doctors.contains_key(&request.doctor_id) {
                    return Err(BookingError::DoctorNotFound);
                }
                if !state.clinics.contains_key(&request.clinic_id) {
                    return Err(BookingError::ClinicNotFound);
                }

                let now = Utc::now();
                let user = match state.find_user_by_phone(&request.phone_number) {
                    Some(existing) => {
                        if existing.is_phone_verified && !existing.is_default_password {
                            return Err(BookingError::FullyRegisteredPhone);
                        }
                        existing.clone()
                    }
                    None => {
                        let user = User {
                            id: Uuid::new_v4(),
                            name: request.patient_name.clone(),
                            phone_number: request.phone_number.clone(),
                            password_hash: default_password_hash.clone(),
                            role: UserRole::Patient,
                            is_phone_verified: true,
                            is_default_password: true,
                            otp: None,
                            otp_expires: None,
                            refresh_token: None,
                            deactivated: false,
                            last_login_at: None,
                            created_at: now,
                            updated_at: now,
                        };
                        state.users.insert(user.id, user.clone());
                        user
                    }
                };

                state
                    .patients
                    .entry(user.id)
                    .or_insert_with(|| PatientProfile::new(user.id, now));

                if state
                    .conflicting_appointment(user.id, request.doctor_id, request.appointment_date)
                    .is_some()
                {
                    return Err(BookingError::DuplicateBooking);
                }

                let appointment = state.insert_appointment(Appointment {
                    id: Uuid::new_v4(),
                    code: generate_booking_code(BOOKING_CODE_LENGTH),
                    serial_number: 0,
                    appointment_date: request.appointment_date,
                    status,
                    patient_name: request.patient_name.clone(),
                    patient_age: request.patient_age.clone(),
                    phone_number: request.phone_number.clone(),
                    address: request.address.clone(),
                    note: request.note.clone(),
                    patient_id: user.id,
                    doctor_id: request.doctor_id,
                    clinic_id: request.clinic_id,
                    created_at: now,
                    updated_at: now,
                });

                state.otps.remove(&request.phone_number);

                let tokens = issue_token_pair(&user, &config)
                    .map_err(|e| BookingError::Internal(e.to_string()))?;
                if let Some(row) = state.users.get_mut(&user.id) {
                    row.refresh_token = Some(tokens.refresh_token.clone());
                    row.last_login_at = Some(now);
                    row.updated_at = now;
                }

                Ok(BookingAuthResponse {
                    appointment,
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                    user: user.summary(),
                })
            })
            .await?;

        info!(
            "Guest booking {} created for doctor {}",
            response.appointment.code, response.appointment.doctor_id
        );
        self.notify_booked(&response.appointment);

        Ok(response)
    }

    /// Booking path for an authenticated patient. No OTP involved; contact
    /// fields fall back to the account values.
    pub async fn book_as_registered(
        &self,
        user: &AuthUser,
        request: RegisteredBookingRequest,
    ) -> Result<Appointment, BookingError> {
        if user.role != UserRole::Patient {
            return Err(BookingError::NotPatient);
        }

        let user_id = user.id;
        let status = self.default_status();

        let appointment = self
            .store
            .transaction(|state| {
                if !state.doctors.contains_key(&request.doctor_id) {
                    return Err(BookingError::DoctorNotFound);
                }
                if !state.clinics.contains_key(&request.clinic_id) {
                    return Err(BookingError::ClinicNotFound);
                }

                let account = state
                    .users
                    .get(&user_id)
                    .cloned()
                    .ok_or_else(|| BookingError::Internal("user record missing".into()))?;

                let now = Utc::now();
                state
                    .patients
                    .entry(user_id)
                    .or_insert_with(|| PatientProfile::new(user_id, now));

                if state
                    .conflicting_appointment(user_id, request.doctor_id, request.appointment_date)
                    .is_some()
                {
                    return Err(BookingError::DuplicateBooking);
                }

                Ok(state.insert_appointment(Appointment {
                    id: Uuid::new_v4(),
                    code: generate_booking_code(BOOKING_CODE_LENGTH),
                    serial_number: 0,
                    appointment_date: request.appointment_date,
                    status,
                    patient_name: request.patient_name.clone().unwrap_or(account.name),
                    patient_age: request.patient_age.clone(),
                    phone_number: account.phone_number,
                    address: request.address.clone(),
                    note: request.note.clone(),
                    patient_id: user_id,
                    doctor_id: request.doctor_id,
                    clinic_id: request.clinic_id,
                    created_at: now,
                    updated_at: now,
                }))
            })
            .await?;

        info!(
            "Appointment {} created by patient {}",
            appointment.code, user_id
        );
        self.notify_booked(&appointment);

        Ok(appointment)
    }

    /// Role-scoped listing: patients see their own bookings, doctors and
    /// clinics their side of the desk, admins everything. Ordered by serial
    /// number, with counters over the scope after any date window.
    pub async fn get_my_appointments(
        &self,
        user: &AuthUser,
        query: AppointmentQuery,
    ) -> Result<(Vec<Appointment>, Meta, AppointmentStats), BookingError> {
        let user_id = user.id;
        let role = user.role;

        let result = self
            .store
            .read(|state| {
                let mut scoped: Vec<Appointment> = state
                    .appointments
                    .values()
                    .filter(|a| match role {
                        UserRole::Patient => a.patient_id == user_id,
                        UserRole::Doctor => a.doctor_id == user_id,
                        UserRole::Clinic => a.clinic_id == user_id,
                        UserRole::Admin => true,
                    })
                    .cloned()
                    .collect();

                if let Some(date) = query.date {
                    scoped.retain(|a| a.appointment_date == date);
                }

                // Counters cover the date window; only the status filter is
                // rows-only.
                let stats = AppointmentStats {
                    total: scoped.len() as i64,
                    scheduled: count_status(&scoped, AppointmentStatus::Scheduled),
                    completed: count_status(&scoped, AppointmentStatus::Completed),
                    cancelled: count_status(&scoped, AppointmentStatus::Cancelled),
                };

                if let Some(status) = query.status {
                    scoped.retain(|a| a.status == status);
                }

                scoped.sort_by_key(|a| a.serial_number);
                if query.sort_order == Some(SortOrder::Desc) {
                    scoped.reverse();
                }

                let total = scoped.len() as i64;
                let window = calculate(&query.page_options());
                let page: Vec<Appointment> = scoped
                    .into_iter()
                    .skip(window.skip)
                    .take(window.limit as usize)
                    .collect();

                (page, Meta::new(window.page, window.limit, total), stats)
            })
            .await;

        Ok(result)
    }

    /// Update status, date or note. Admins may touch anything, doctors and
    /// clinics their own appointments; a patient may only cancel their own.
    /// Terminal appointments are frozen.
    pub async fn update_appointment(
        &self,
        user: &AuthUser,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let user_id = user.id;
        let role = user.role;

        let (appointment, status_changed) = self
            .store
            .transaction(|state| {
                let current = state
                    .appointments
                    .get(&appointment_id)
                    .cloned()
                    .ok_or(BookingError::AppointmentNotFound)?;

                let allowed = match role {
                    UserRole::Admin => true,
                    UserRole::Doctor => current.doctor_id == user_id,
                    UserRole::Clinic => current.clinic_id == user_id,
                    UserRole::Patient => {
                        current.patient_id == user_id
                            && request.status == Some(AppointmentStatus::Cancelled)
                    }
                };
                if !allowed {
                    return Err(BookingError::NotAllowed);
                }

                if current.status.is_terminal() {
                    return Err(BookingError::TerminalStatus(current.status));
                }

                let row = state
                    .appointments
                    .get_mut(&appointment_id)
                    .ok_or(BookingError::AppointmentNotFound)?;
                let mut status_changed = false;
                if let Some(status) = request.status {
                    status_changed = status != row.status;
                    row.status = status;
                }
                if let Some(date) = request.appointment_date {
                    row.appointment_date = date;
                }
                if let Some(note) = &request.note {
                    row.note = Some(note.clone());
                }
                row.updated_at = Utc::now();
                Ok((row.clone(), status_changed))
            })
            .await?;

        if status_changed {
            // A patient cancelling informs the doctor; everyone else
            // informs the patient.
            let recipient = if role == UserRole::Patient {
                appointment.doctor_id
            } else {
                appointment.patient_id
            };
            let notifier = Arc::clone(&self.notifier);
            let body = format!(
                "Appointment {} is now {}",
                appointment.code, appointment.status
            );
            tokio::spawn(async move {
                notifier
                    .notify(recipient, "Appointment updated", &body)
                    .await;
            });
        }

        Ok(appointment)
    }

    /// Post-commit push to the clinic's devices. Spawned so a slow or
    /// failing gateway never holds up the booking response.
    fn notify_booked(&self, appointment: &Appointment) {
        let notifier = Arc::clone(&self.notifier);
        let clinic_id = appointment.clinic_id;
        let body = format!(
            "New appointment {} on {}",
            appointment.code, appointment.appointment_date
        );
        tokio::spawn(async move {
            notifier.notify(clinic_id, "New appointment", &body).await;
        });
    }
}

fn count_status(appointments: &[Appointment], status: AppointmentStatus) -> i64 {
    appointments.iter().filter(|a| a.status == status).count() as i64
}

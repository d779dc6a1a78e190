use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentQuery, BookingError, GuestBookingRequest, RegisteredBookingRequest,
    UpdateAppointmentRequest,
};
use appointment_cell::services::booking::BookingService;
use notification_cell::models::MulticastOutcome;
use notification_cell::services::notifier::Notifier;
use notification_cell::services::push::PushGateway;
use shared_config::AppConfig;
use shared_models::appointment::AppointmentStatus;
use shared_models::auth::AuthUser;
use shared_models::user::{ClinicProfile, DoctorProfile, User, UserRole};
use shared_store::Store;
use shared_utils::jwt::verify_token;
use shared_utils::password::hash_password;

const GUEST_PHONE: &str = "01712345678";

struct NullGateway;

#[async_trait]
impl PushGateway for NullGateway {
    async fn send_multicast(
        &self,
        _tokens: &[String],
        _title: &str,
        _body: &str,
    ) -> anyhow::Result<MulticastOutcome> {
        Ok(MulticastOutcome::default())
    }
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        jwt_access_secret: "access-secret".into(),
        jwt_refresh_secret: "refresh-secret".into(),
        access_token_ttl_days: 5,
        refresh_token_ttl_days: 365,
        registration_otp_ttl_minutes: 10,
        login_otp_ttl_minutes: 5,
        booking_otp_ttl_minutes: 5,
        guest_default_password: "Default3@#".into(),
        booking_default_status: "PENDING".into(),
        push_gateway_url: String::new(),
        push_gateway_server_key: String::new(),
        port: 3000,
    })
}

fn service() -> (Arc<Store>, BookingService) {
    let store = Arc::new(Store::new());
    let notifier = Arc::new(Notifier::new(store.clone(), Arc::new(NullGateway)));
    let booking = BookingService::new(store.clone(), test_config(), notifier);
    (store, booking)
}

async fn seed_user(store: &Arc<Store>, phone: &str, role: UserRole) -> Uuid {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: "Seeded".to_string(),
        phone_number: phone.to_string(),
        password_hash: hash_password("StrongPass1!").unwrap(),
        role,
        is_phone_verified: true,
        is_default_password: false,
        otp: None,
        otp_expires: None,
        refresh_token: None,
        deactivated: false,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    };
    let id = user.id;

    store
        .transaction(move |state| {
            match role {
                UserRole::Doctor => {
                    state
                        .doctors
                        .insert(id, DoctorProfile::new(id, "General", now));
                }
                UserRole::Clinic => {
                    state.clinics.insert(id, ClinicProfile::new(id, now));
                }
                _ => {}
            }
            state.users.insert(id, user);
            Ok::<_, BookingError>(())
        })
        .await
        .unwrap();

    id
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
}

fn guest_request(doctor_id: Uuid, clinic_id: Uuid, otp: &str) -> GuestBookingRequest {
    GuestBookingRequest {
        patient_name: "Rahim".to_string(),
        patient_age: Some("34".to_string()),
        phone_number: GUEST_PHONE.to_string(),
        address: Some("Dhaka".to_string()),
        note: None,
        appointment_date: date(10),
        doctor_id,
        clinic_id,
        otp: otp.to_string(),
    }
}

async fn issued_otp(store: &Store, phone: &str) -> String {
    store
        .read(|state| state.otps.get(phone).map(|r| r.code.clone()).unwrap())
        .await
}

#[tokio::test]
async fn send_booking_otp_stores_a_record() {
    let (store, booking) = service();

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();

    store
        .read(|state| {
            let record = state.otps.get(GUEST_PHONE).unwrap();
            assert_eq!(record.code.len(), 6);
            assert!(record.expires_at > Utc::now());
        })
        .await;
}

#[tokio::test]
async fn send_booking_otp_rejects_fully_registered_phones() {
    let (store, booking) = service();
    seed_user(&store, GUEST_PHONE, UserRole::Patient).await;

    let err = booking.send_booking_otp(GUEST_PHONE).await.unwrap_err();
    assert_matches!(err, BookingError::FullyRegisteredPhone);
}

#[tokio::test]
async fn guest_booking_creates_account_appointment_and_session() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();
    let otp = issued_otp(&store, GUEST_PHONE).await;

    let response = booking
        .book_as_guest(guest_request(doctor_id, clinic_id, &otp))
        .await
        .unwrap();

    assert_eq!(response.appointment.status, AppointmentStatus::Pending);
    assert_eq!(response.appointment.code.len(), 6);
    assert_eq!(response.appointment.serial_number, 1);
    assert_eq!(response.user.role, UserRole::Patient);

    let claims = verify_token(&response.access_token, "access-secret").unwrap();
    assert_eq!(claims.user_id, response.user.id);

    store
        .read(|state| {
            let user = state.find_user_by_phone(GUEST_PHONE).unwrap();
            assert!(user.is_default_password);
            assert!(user.is_phone_verified);
            assert_eq!(
                user.refresh_token.as_deref(),
                Some(response.refresh_token.as_str())
            );
            assert!(state.patients.contains_key(&user.id));
            // The OTP is consumed with the booking.
            assert!(!state.otps.contains_key(GUEST_PHONE));
        })
        .await;
}

#[tokio::test]
async fn guest_booking_rejects_wrong_and_expired_otp() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();

    let err = booking
        .book_as_guest(guest_request(doctor_id, clinic_id, "000000"))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::InvalidOtp);

    let otp = issued_otp(&store, GUEST_PHONE).await;
    store
        .transaction(|state| {
            state.otps.get_mut(GUEST_PHONE).unwrap().expires_at =
                Utc::now() - Duration::minutes(1);
            Ok::<_, BookingError>(())
        })
        .await
        .unwrap();

    let err = booking
        .book_as_guest(guest_request(doctor_id, clinic_id, &otp))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::OtpExpired);
}

#[tokio::test]
async fn same_day_double_booking_is_rejected_atomically() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();
    let otp = issued_otp(&store, GUEST_PHONE).await;
    booking
        .book_as_guest(guest_request(doctor_id, clinic_id, &otp))
        .await
        .unwrap();

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();
    let otp = issued_otp(&store, GUEST_PHONE).await;
    let err = booking
        .book_as_guest(guest_request(doctor_id, clinic_id, &otp))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::DuplicateBooking);

    store
        .read(|state| {
            assert_eq!(state.appointments.len(), 1);
            // The failed attempt rolled back, so its OTP survives.
            assert!(state.otps.contains_key(GUEST_PHONE));
        })
        .await;
}

#[tokio::test]
async fn different_day_booking_with_the_same_doctor_is_allowed() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();
    let otp = issued_otp(&store, GUEST_PHONE).await;
    booking
        .book_as_guest(guest_request(doctor_id, clinic_id, &otp))
        .await
        .unwrap();

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();
    let otp = issued_otp(&store, GUEST_PHONE).await;
    let mut second = guest_request(doctor_id, clinic_id, &otp);
    second.appointment_date = date(11);
    let response = booking.book_as_guest(second).await.unwrap();

    assert_eq!(response.appointment.serial_number, 2);
}

#[tokio::test]
async fn cancelled_appointment_frees_the_day_for_rebooking() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();
    let otp = issued_otp(&store, GUEST_PHONE).await;
    let first = booking
        .book_as_guest(guest_request(doctor_id, clinic_id, &otp))
        .await
        .unwrap();

    store
        .transaction(|state| {
            state
                .appointments
                .get_mut(&first.appointment.id)
                .unwrap()
                .status = AppointmentStatus::Cancelled;
            Ok::<_, BookingError>(())
        })
        .await
        .unwrap();

    booking.send_booking_otp(GUEST_PHONE).await.unwrap();
    let otp = issued_otp(&store, GUEST_PHONE).await;
    booking
        .book_as_guest(guest_request(doctor_id, clinic_id, &otp))
        .await
        .unwrap();
}

#[tokio::test]
async fn registered_booking_requires_the_patient_role() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;

    let doctor = AuthUser {
        id: doctor_id,
        phone_number: "01812345678".to_string(),
        role: UserRole::Doctor,
    };
    let err = booking
        .book_as_registered(
            &doctor,
            RegisteredBookingRequest {
                patient_name: None,
                patient_age: None,
                address: None,
                note: None,
                appointment_date: date(10),
                doctor_id,
                clinic_id,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::NotPatient);
}

#[tokio::test]
async fn registered_booking_shares_the_duplicate_rule_with_the_guest_path() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;
    let patient_id = seed_user(&store, GUEST_PHONE, UserRole::Patient).await;

    let patient = AuthUser {
        id: patient_id,
        phone_number: GUEST_PHONE.to_string(),
        role: UserRole::Patient,
    };
    let request = RegisteredBookingRequest {
        patient_name: None,
        patient_age: None,
        address: None,
        note: Some("follow-up".to_string()),
        appointment_date: date(10),
        doctor_id,
        clinic_id,
    };

    let appointment = booking
        .book_as_registered(&patient, request.clone())
        .await
        .unwrap();
    assert_eq!(appointment.patient_name, "Seeded");
    assert_eq!(appointment.phone_number, GUEST_PHONE);

    let err = booking
        .book_as_registered(&patient, request)
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::DuplicateBooking);
}

#[tokio::test]
async fn listing_is_role_scoped_with_stats_and_serial_order() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let other_doctor_id = seed_user(&store, "01822345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;
    let patient_id = seed_user(&store, GUEST_PHONE, UserRole::Patient).await;

    let patient = AuthUser {
        id: patient_id,
        phone_number: GUEST_PHONE.to_string(),
        role: UserRole::Patient,
    };

    for (day, doctor) in [(10, doctor_id), (11, doctor_id), (12, other_doctor_id)] {
        booking
            .book_as_registered(
                &patient,
                RegisteredBookingRequest {
                    patient_name: None,
                    patient_age: None,
                    address: None,
                    note: None,
                    appointment_date: date(day),
                    doctor_id: doctor,
                    clinic_id,
                },
            )
            .await
            .unwrap();
    }

    // Flip one appointment to completed for the stats block.
    store
        .transaction(|state| {
            let id = state
                .appointments
                .values()
                .find(|a| a.serial_number == 1)
                .unwrap()
                .id;
            state.appointments.get_mut(&id).unwrap().status = AppointmentStatus::Completed;
            Ok::<_, BookingError>(())
        })
        .await
        .unwrap();

    let (appointments, meta, stats) = booking
        .get_my_appointments(&patient, AppointmentQuery::default())
        .await
        .unwrap();
    assert_eq!(appointments.len(), 3);
    assert_eq!(meta.total, 3);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert!(appointments.windows(2).all(|w| w[0].serial_number < w[1].serial_number));

    let doctor = AuthUser {
        id: doctor_id,
        phone_number: "01812345678".to_string(),
        role: UserRole::Doctor,
    };
    let (appointments, _, stats) = booking
        .get_my_appointments(&doctor, AppointmentQuery::default())
        .await
        .unwrap();
    assert_eq!(appointments.len(), 2);
    assert_eq!(stats.total, 2);

    let (page, meta, _) = booking
        .get_my_appointments(
            &patient,
            AppointmentQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(meta.total_page, 2);
}

#[tokio::test]
async fn status_filter_narrows_the_listing_but_not_the_stats() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;
    let patient_id = seed_user(&store, GUEST_PHONE, UserRole::Patient).await;

    let patient = AuthUser {
        id: patient_id,
        phone_number: GUEST_PHONE.to_string(),
        role: UserRole::Patient,
    };
    for day in [10, 11] {
        booking
            .book_as_registered(
                &patient,
                RegisteredBookingRequest {
                    patient_name: None,
                    patient_age: None,
                    address: None,
                    note: None,
                    appointment_date: date(day),
                    doctor_id,
                    clinic_id,
                },
            )
            .await
            .unwrap();
    }
    store
        .transaction(|state| {
            let id = state
                .appointments
                .values()
                .find(|a| a.serial_number == 2)
                .unwrap()
                .id;
            state.appointments.get_mut(&id).unwrap().status = AppointmentStatus::Cancelled;
            Ok::<_, BookingError>(())
        })
        .await
        .unwrap();

    let (appointments, _, stats) = booking
        .get_my_appointments(
            &patient,
            AppointmentQuery {
                status: Some(AppointmentStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(stats.total, 2);
    assert_eq!(stats.cancelled, 1);

    let (on_day, _, day_stats) = booking
        .get_my_appointments(
            &patient,
            AppointmentQuery {
                date: Some(date(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].appointment_date, date(10));
    // The date window scopes the counters too, unlike the status filter.
    assert_eq!(day_stats.total, 1);
    assert_eq!(day_stats.cancelled, 0);
}

#[tokio::test]
async fn update_rules_cover_doctor_patient_and_terminal_states() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let other_doctor_id = seed_user(&store, "01822345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;
    let patient_id = seed_user(&store, GUEST_PHONE, UserRole::Patient).await;

    let patient = AuthUser {
        id: patient_id,
        phone_number: GUEST_PHONE.to_string(),
        role: UserRole::Patient,
    };
    let appointment = booking
        .book_as_registered(
            &patient,
            RegisteredBookingRequest {
                patient_name: None,
                patient_age: None,
                address: None,
                note: None,
                appointment_date: date(10),
                doctor_id,
                clinic_id,
            },
        )
        .await
        .unwrap();

    // A doctor not on the appointment cannot touch it.
    let stranger = AuthUser {
        id: other_doctor_id,
        phone_number: "01822345678".to_string(),
        role: UserRole::Doctor,
    };
    let err = booking
        .update_appointment(
            &stranger,
            appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::NotAllowed);

    // The patient may only cancel, not reschedule.
    let err = booking
        .update_appointment(
            &patient,
            appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::NotAllowed);

    let doctor = AuthUser {
        id: doctor_id,
        phone_number: "01812345678".to_string(),
        role: UserRole::Doctor,
    };
    let updated = booking
        .update_appointment(
            &doctor,
            appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, AppointmentStatus::Completed);

    let err = booking
        .update_appointment(
            &doctor,
            appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::TerminalStatus(AppointmentStatus::Completed));
}

#[tokio::test]
async fn patient_can_cancel_their_own_appointment() {
    let (store, booking) = service();
    let doctor_id = seed_user(&store, "01812345678", UserRole::Doctor).await;
    let clinic_id = seed_user(&store, "01912345678", UserRole::Clinic).await;
    let patient_id = seed_user(&store, GUEST_PHONE, UserRole::Patient).await;

    let patient = AuthUser {
        id: patient_id,
        phone_number: GUEST_PHONE.to_string(),
        role: UserRole::Patient,
    };
    let appointment = booking
        .book_as_registered(
            &patient,
            RegisteredBookingRequest {
                patient_name: None,
                patient_age: None,
                address: None,
                note: None,
                appointment_date: date(10),
                doctor_id,
                clinic_id,
            },
        )
        .await
        .unwrap();

    let cancelled = booking
        .update_appointment(
            &patient,
            appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

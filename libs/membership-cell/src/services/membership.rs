use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::membership::{Membership, Schedule};
use shared_models::response::Meta;
use shared_models::user::UserRole;
use shared_store::Store;
use shared_utils::pagination::calculate;

use crate::models::{
    CreateMembershipRequest, MembershipError, MembershipQuery, MembershipWithSchedules,
    ScheduleRequest, UpdateMembershipRequest,
};

pub struct MembershipService {
    store: Arc<Store>,
}

impl MembershipService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// A clinic grants a doctor practicing rights at its premises. One
    /// membership per (doctor, clinic) pair.
    pub async fn create_membership(
        &self,
        user: &AuthUser,
        request: CreateMembershipRequest,
    ) -> Result<Membership, MembershipError> {
        if user.role != UserRole::Clinic {
            return Err(MembershipError::NotClinic);
        }
        let clinic_id = user.id;

        let membership = self
            .store
            .transaction(|state| {
                if !state.clinics.contains_key(&clinic_id) {
                    return Err(MembershipError::NotClinic);
                }
                if !state.doctors.contains_key(&request.doctor_id) {
                    return Err(MembershipError::DoctorNotFound);
                }
                if state
                    .membership_for_pair(request.doctor_id, clinic_id)
                    .is_some()
                {
                    return Err(MembershipError::DuplicateMembership);
                }

                let now = Utc::now();
                let membership = Membership {
                    id: Uuid::new_v4(),
                    doctor_id: request.doctor_id,
                    clinic_id,
                    fee: request.fee,
                    discount: request.discount,
                    max_appointments: request.max_appointments,
                    created_at: now,
                    updated_at: now,
                };
                state.memberships.insert(membership.id, membership.clone());
                Ok(membership)
            })
            .await?;

        info!(
            "Membership {} created for doctor {} at clinic {}",
            membership.id, membership.doctor_id, membership.clinic_id
        );
        Ok(membership)
    }

    /// Public listing, optionally narrowed to one doctor or one clinic.
    pub async fn list_memberships(
        &self,
        query: MembershipQuery,
    ) -> Result<(Vec<MembershipWithSchedules>, Meta), MembershipError> {
        let result = self
            .store
            .read(|state| {
                let mut memberships: Vec<Membership> = state
                    .memberships
                    .values()
                    .filter(|m| query.doctor_id.map_or(true, |id| m.doctor_id == id))
                    .filter(|m| query.clinic_id.map_or(true, |id| m.clinic_id == id))
                    .cloned()
                    .collect();
                memberships.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                let total = memberships.len() as i64;
                let window = calculate(&query.page_options());
                let page: Vec<MembershipWithSchedules> = memberships
                    .into_iter()
                    .skip(window.skip)
                    .take(window.limit as usize)
                    .map(|membership| MembershipWithSchedules {
                        schedules: state.schedules_for_membership(membership.id),
                        membership,
                    })
                    .collect();

                (page, Meta::new(window.page, window.limit, total))
            })
            .await;

        Ok(result)
    }

    pub async fn update_membership(
        &self,
        user: &AuthUser,
        membership_id: Uuid,
        request: UpdateMembershipRequest,
    ) -> Result<Membership, MembershipError> {
        let user_id = user.id;
        let is_admin = user.role == UserRole::Admin;

        self.store
            .transaction(|state| {
                let row = state
                    .memberships
                    .get_mut(&membership_id)
                    .ok_or(MembershipError::MembershipNotFound)?;
                if row.clinic_id != user_id && !is_admin {
                    return Err(MembershipError::NotOwner);
                }

                if let Some(fee) = request.fee {
                    row.fee = fee;
                }
                if request.discount.is_some() {
                    row.discount = request.discount;
                }
                if request.max_appointments.is_some() {
                    row.max_appointments = request.max_appointments;
                }
                row.updated_at = Utc::now();
                Ok(row.clone())
            })
            .await
    }

    /// Delete a membership along with its schedules.
    pub async fn delete_membership(
        &self,
        user: &AuthUser,
        membership_id: Uuid,
    ) -> Result<(), MembershipError> {
        let user_id = user.id;
        let is_admin = user.role == UserRole::Admin;

        self.store
            .transaction(|state| {
                let membership = state
                    .memberships
                    .get(&membership_id)
                    .cloned()
                    .ok_or(MembershipError::MembershipNotFound)?;
                if membership.clinic_id != user_id && !is_admin {
                    return Err(MembershipError::NotOwner);
                }

                state.memberships.remove(&membership_id);
                state.schedules.retain(|_, s| s.membership_id != membership_id);
                Ok(())
            })
            .await
    }

    pub async fn add_schedule(
        &self,
        user: &AuthUser,
        membership_id: Uuid,
        request: ScheduleRequest,
    ) -> Result<Schedule, MembershipError> {
        if request.days.is_empty() {
            return Err(MembershipError::EmptyDays);
        }
        if request.end_time <= request.start_time {
            return Err(MembershipError::InvalidTimeRange);
        }

        let user_id = user.id;
        let is_admin = user.role == UserRole::Admin;

        self.store
            .transaction(|state| {
                let membership = state
                    .memberships
                    .get(&membership_id)
                    .ok_or(MembershipError::MembershipNotFound)?;
                if membership.clinic_id != user_id && !is_admin {
                    return Err(MembershipError::NotOwner);
                }

                let now = Utc::now();
                let schedule = Schedule {
                    id: Uuid::new_v4(),
                    membership_id,
                    days: request.days.clone(),
                    start_time: request.start_time,
                    end_time: request.end_time,
                    created_at: now,
                    updated_at: now,
                };
                state.schedules.insert(schedule.id, schedule.clone());
                Ok(schedule)
            })
            .await
    }

    pub async fn delete_schedule(
        &self,
        user: &AuthUser,
        schedule_id: Uuid,
    ) -> Result<(), MembershipError> {
        let user_id = user.id;
        let is_admin = user.role == UserRole::Admin;

        self.store
            .transaction(|state| {
                let schedule = state
                    .schedules
                    .get(&schedule_id)
                    .cloned()
                    .ok_or(MembershipError::ScheduleNotFound)?;
                let owner = state
                    .memberships
                    .get(&schedule.membership_id)
                    .map(|m| m.clinic_id);
                if owner != Some(user_id) && !is_admin {
                    return Err(MembershipError::NotOwner);
                }

                state.schedules.remove(&schedule_id);
                Ok(())
            })
            .await
    }
}

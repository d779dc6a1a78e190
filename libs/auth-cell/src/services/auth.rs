use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::TokenPair;
use shared_models::user::{
    ClinicProfile, DoctorProfile, PatientProfile, User, UserRole, UserSummary,
};
use shared_store::Store;
use shared_utils::codes::generate_otp_code;
use shared_utils::jwt::{issue_token_pair, verify_token};
use shared_utils::password::{
    hash_password, is_valid_phone_number, meets_password_policy, verify_password,
};

use crate::models::{
    AuthError, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    ResetPasswordRequest,
};

pub struct AuthService {
    store: Arc<Store>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(store: Arc<Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Register a phone number. An unverified existing user is overwritten
    /// in place; a verified one is a conflict. New users get a role-matched
    /// profile row in the same transaction.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserSummary, AuthError> {
        if !is_valid_phone_number(&request.phone_number) {
            return Err(AuthError::InvalidPhoneNumber);
        }
        if !meets_password_policy(&request.password) {
            return Err(AuthError::WeakPassword);
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| AuthError::Internal(e.to_string()))?;
        let otp = generate_otp_code();
        let otp_expires = Utc::now() + Duration::minutes(self.config.registration_otp_ttl_minutes);

        let summary = self
            .store
            .transaction(|state| {
                let now = Utc::now();

                if let Some(existing) = state.find_user_by_phone(&request.phone_number) {
                    if existing.is_phone_verified {
                        return Err(AuthError::PhoneAlreadyRegistered);
                    }

                    let id = existing.id;
                    let user = state.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
                    user.password_hash = password_hash.clone();
                    if let Some(name) = &request.name {
                        user.name = name.clone();
                    }
                    user.role = request.role.unwrap_or(user.role);
                    user.otp = Some(otp.clone());
                    user.otp_expires = Some(otp_expires);
                    user.updated_at = now;
                    return Ok(user.summary());
                }

                let role = request.role.unwrap_or(UserRole::Patient);
                let user = User {
                    id: Uuid::new_v4(),
                    name: request.name.clone().unwrap_or_default(),
                    phone_number: request.phone_number.clone(),
                    password_hash: password_hash.clone(),
                    role,
                    is_phone_verified: false,
                    is_default_password: false,
                    otp: Some(otp.clone()),
                    otp_expires: Some(otp_expires),
                    refresh_token: None,
                    deactivated: false,
                    last_login_at: None,
                    created_at: now,
                    updated_at: now,
                };

                match role {
                    UserRole::Patient => {
                        state
                            .patients
                            .insert(user.id, PatientProfile::new(user.id, now));
                    }
                    UserRole::Doctor => {
                        state
                            .doctors
                            .insert(user.id, DoctorProfile::new(user.id, "General", now));
                    }
                    UserRole::Clinic => {
                        state
                            .clinics
                            .insert(user.id, ClinicProfile::new(user.id, now));
                    }
                    UserRole::Admin => {}
                }

                let summary = user.summary();
                state.users.insert(user.id, user);
                Ok(summary)
            })
            .await?;

        // SMS delivery is an external collaborator; the code is logged for
        // development the way the original backend did.
        debug!("Registration OTP for {}: {}", request.phone_number, otp);
        info!("User registered for phone {}", request.phone_number);

        Ok(summary)
    }

    /// Verify the user-embedded OTP, mark the phone verified and clear the
    /// code so it cannot be replayed.
    pub async fn verify_otp(&self, phone_number: &str, otp: &str) -> Result<(), AuthError> {
        self.store
            .transaction(|state| {
                let user = state
                    .find_user_by_phone_mut(phone_number)
                    .ok_or(AuthError::UserNotFound)?;

                match &user.otp {
                    Some(stored) if stored == otp => {}
                    _ => return Err(AuthError::InvalidOtp),
                }

                let expired = match user.otp_expires {
                    Some(expires) => Utc::now() > expires,
                    None => true,
                };
                if expired {
                    return Err(AuthError::OtpExpired);
                }

                user.is_phone_verified = true;
                user.otp = None;
                user.otp_expires = None;
                user.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let config = Arc::clone(&self.config);

        self.store
            .transaction(|state| {
                let user = state
                    .find_user_by_phone(&request.phone_number)
                    .cloned()
                    .ok_or(AuthError::InvalidCredentials)?;

                if !verify_password(&request.password, &user.password_hash) {
                    return Err(AuthError::InvalidCredentials);
                }
                if user.deactivated {
                    return Err(AuthError::AccountDeactivated);
                }
                if !user.is_phone_verified {
                    return Err(AuthError::PhoneNotVerified);
                }

                let tokens = issue_token_pair(&user, &config)
                    .map_err(|e| AuthError::Internal(e.to_string()))?;

                let now = Utc::now();
                if let Some(row) = state.users.get_mut(&user.id) {
                    row.refresh_token = Some(tokens.refresh_token.clone());
                    row.last_login_at = Some(now);
                    row.updated_at = now;
                }

                info!("User {} logged in", user.id);
                Ok(LoginResponse::new(tokens, user.summary()))
            })
            .await
    }

    /// Re-issue a login/reset OTP onto the user row. A fresh code always
    /// replaces the previous one.
    pub async fn send_otp(&self, phone_number: &str) -> Result<(), AuthError> {
        let otp = generate_otp_code();
        let otp_expires = Utc::now() + Duration::minutes(self.config.login_otp_ttl_minutes);

        self.store
            .transaction(|state| {
                let user = state
                    .find_user_by_phone_mut(phone_number)
                    .ok_or(AuthError::UserNotFound)?;

                if user.deactivated {
                    return Err(AuthError::AccountDeactivated);
                }

                user.otp = Some(otp.clone());
                user.otp_expires = Some(otp_expires);
                user.updated_at = Utc::now();
                Ok(())
            })
            .await?;

        debug!("OTP for {}: {}", phone_number, otp);
        Ok(())
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), AuthError> {
        if !meets_password_policy(&request.new_password) {
            return Err(AuthError::WeakPassword);
        }

        let password_hash =
            hash_password(&request.new_password).map_err(|e| AuthError::Internal(e.to_string()))?;

        self.store
            .transaction(|state| {
                let user = state
                    .find_user_by_phone_mut(&request.phone_number)
                    .ok_or(AuthError::InvalidOtp)?;

                match &user.otp {
                    Some(stored) if *stored == request.otp => {}
                    _ => return Err(AuthError::InvalidOtp),
                }
                if let Some(expires) = user.otp_expires {
                    if Utc::now() > expires {
                        return Err(AuthError::OtpExpired);
                    }
                }

                user.password_hash = password_hash.clone();
                user.otp = None;
                user.otp_expires = None;
                user.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    /// Change password for an authenticated user. Clears the stored refresh
    /// token and the default-password flag, so a guest-claimed account
    /// becomes fully owned.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        if !meets_password_policy(&request.new_password) {
            return Err(AuthError::WeakPassword);
        }

        let password_hash =
            hash_password(&request.new_password).map_err(|e| AuthError::Internal(e.to_string()))?;

        self.store
            .transaction(|state| {
                let user = state.users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;

                if !verify_password(&request.old_password, &user.password_hash) {
                    return Err(AuthError::InvalidCredentials);
                }

                user.password_hash = password_hash.clone();
                user.refresh_token = None;
                user.is_default_password = false;
                user.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    /// Rotate the token pair. The presented refresh token must both verify
    /// and match the persisted one.
    pub async fn refresh_token(&self, token: &str) -> Result<TokenPair, AuthError> {
        let claims = verify_token(token, &self.config.jwt_refresh_secret)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        let config = Arc::clone(&self.config);
        let presented = token.to_string();

        self.store
            .transaction(|state| {
                let user = state
                    .users
                    .get(&claims.user_id)
                    .cloned()
                    .ok_or(AuthError::InvalidRefreshToken)?;

                if user.refresh_token.as_deref() != Some(presented.as_str()) {
                    return Err(AuthError::InvalidRefreshToken);
                }

                let tokens = issue_token_pair(&user, &config)
                    .map_err(|e| AuthError::Internal(e.to_string()))?;

                if let Some(row) = state.users.get_mut(&user.id) {
                    row.refresh_token = Some(tokens.refresh_token.clone());
                    row.updated_at = Utc::now();
                }

                Ok(tokens)
            })
            .await
    }

    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.store
            .transaction(|state| {
                let user = state.users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
                user.refresh_token = None;
                user.updated_at = Utc::now();
                Ok(())
            })
            .await
    }
}

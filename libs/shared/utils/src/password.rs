use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use regex::Regex;

use shared_models::error::AppError;

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn class_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// At least 8 characters with an upper, a lower, a digit and a special
/// character.
pub fn meets_password_policy(password: &str) -> bool {
    static LOWER: OnceLock<Regex> = OnceLock::new();
    static UPPER: OnceLock<Regex> = OnceLock::new();
    static DIGIT: OnceLock<Regex> = OnceLock::new();
    static SPECIAL: OnceLock<Regex> = OnceLock::new();

    password.len() >= 8
        && class_regex(&LOWER, "[a-z]").is_match(password)
        && class_regex(&UPPER, "[A-Z]").is_match(password)
        && class_regex(&DIGIT, r"\d").is_match(password)
        && class_regex(&SPECIAL, "[^A-Za-z0-9]").is_match(password)
}

/// Local 11-digit mobile number format (01XXXXXXXXX).
pub fn is_valid_phone_number(phone: &str) -> bool {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    class_regex(&PHONE, r"^01[3-9]\d{8}$").is_match(phone)
}

use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_access_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_ttl_days: i64,
    pub refresh_token_ttl_days: i64,
    pub registration_otp_ttl_minutes: i64,
    pub login_otp_ttl_minutes: i64,
    pub booking_otp_ttl_minutes: i64,
    pub guest_default_password: String,
    /// Initial status for freshly booked appointments: "PENDING" or "SCHEDULED".
    pub booking_default_status: String,
    pub push_gateway_url: String,
    pub push_gateway_server_key: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_access_secret: env::var("JWT_ACCESS_SECRET").unwrap_or_else(|_| {
                warn!("JWT_ACCESS_SECRET not set, using empty value");
                String::new()
            }),
            jwt_refresh_secret: env::var("JWT_REFRESH_SECRET").unwrap_or_else(|_| {
                warn!("JWT_REFRESH_SECRET not set, using empty value");
                String::new()
            }),
            access_token_ttl_days: parse_env("ACCESS_TOKEN_TTL_DAYS", 5),
            refresh_token_ttl_days: parse_env("REFRESH_TOKEN_TTL_DAYS", 365),
            registration_otp_ttl_minutes: parse_env("REGISTRATION_OTP_TTL_MINUTES", 10),
            login_otp_ttl_minutes: parse_env("LOGIN_OTP_TTL_MINUTES", 5),
            booking_otp_ttl_minutes: parse_env("BOOKING_OTP_TTL_MINUTES", 5),
            guest_default_password: env::var("GUEST_DEFAULT_PASSWORD")
                .unwrap_or_else(|_| "Default3@#".to_string()),
            booking_default_status: env::var("BOOKING_DEFAULT_STATUS")
                .unwrap_or_else(|_| "PENDING".to_string()),
            push_gateway_url: env::var("PUSH_GATEWAY_URL").unwrap_or_else(|_| {
                warn!("PUSH_GATEWAY_URL not set, push notifications disabled");
                String::new()
            }),
            push_gateway_server_key: env::var("PUSH_GATEWAY_SERVER_KEY").unwrap_or_else(|_| {
                warn!("PUSH_GATEWAY_SERVER_KEY not set, using empty value");
                String::new()
            }),
            port: parse_env("PORT", 3000u16),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_access_secret.is_empty() && !self.jwt_refresh_secret.is_empty()
    }

    pub fn is_push_configured(&self) -> bool {
        !self.push_gateway_url.is_empty() && !self.push_gateway_server_key.is_empty()
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

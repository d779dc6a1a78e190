use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Push token registered by a client device. Keyed by the token string;
/// re-registering moves the token to the new user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceToken {
    pub token: String,
    pub user_id: Uuid,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

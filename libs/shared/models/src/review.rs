use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewTargetType {
    Doctor,
    Clinic,
}

impl fmt::Display for ReviewTargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewTargetType::Doctor => write!(f, "DOCTOR"),
            ReviewTargetType::Clinic => write!(f, "CLINIC"),
        }
    }
}

impl std::str::FromStr for ReviewTargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DOCTOR" => Ok(ReviewTargetType::Doctor),
            "CLINIC" => Ok(ReviewTargetType::Clinic),
            other => Err(format!("unknown review target: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// One row per (reviewer, target); the store enforces the pair unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    /// User id of the reviewed doctor or clinic.
    pub target_id: Uuid,
    pub target_type: ReviewTargetType,
    /// 1-5 inclusive.
    pub rating: u8,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// At most one reply per review, written by the target owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewReply {
    pub id: Uuid,
    pub review_id: Uuid,
    pub replied_by_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

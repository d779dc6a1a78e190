use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDeviceTokenRequest {
    pub token: String,
    pub platform: Option<String>,
}

/// Summary of one multicast send, including tokens the gateway reported as
/// no longer registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulticastOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub unregistered_tokens: Vec<String>,
}

// Wire types for the FCM-style multicast endpoint.

#[derive(Debug, Serialize)]
pub struct GatewayRequest {
    pub registration_ids: Vec<String>,
    pub notification: GatewayNotification,
}

#[derive(Debug, Serialize)]
pub struct GatewayNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct GatewayResponse {
    pub success: usize,
    pub failure: usize,
    pub results: Vec<GatewaySendResult>,
}

#[derive(Debug, Deserialize)]
pub struct GatewaySendResult {
    pub message_id: Option<String>,
    pub error: Option<String>,
}

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{GatewayNotification, GatewayRequest, GatewayResponse, MulticastOutcome};

/// The gateway reports a token as gone with this error code; we use it to
/// prune the token store.
const ERROR_NOT_REGISTERED: &str = "NotRegistered";

/// Seam over the push-notification gateway so dispatch semantics can be
/// tested without the network.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> Result<MulticastOutcome>;
}

/// HTTP client for an FCM-style multicast endpoint.
pub struct FcmClient {
    client: Client,
    url: String,
    server_key: String,
}

impl FcmClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.push_gateway_url.clone(),
            server_key: config.push_gateway_server_key.clone(),
        }
    }
}

#[async_trait]
impl PushGateway for FcmClient {
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> Result<MulticastOutcome> {
        let request = GatewayRequest {
            registration_ids: tokens.to_vec(),
            notification: GatewayNotification {
                title: title.to_string(),
                body: body.to_string(),
            },
        };

        debug!("Sending multicast push to {} tokens", tokens.len());

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Push gateway error ({}): {}", status, error_text));
        }

        let parsed: GatewayResponse = response.json().await?;

        let unregistered_tokens = parsed
            .results
            .iter()
            .zip(tokens.iter())
            .filter(|(result, _)| result.error.as_deref() == Some(ERROR_NOT_REGISTERED))
            .map(|(_, token)| token.clone())
            .collect();

        Ok(MulticastOutcome {
            success_count: parsed.success,
            failure_count: parsed.failure,
            unregistered_tokens,
        })
    }
}

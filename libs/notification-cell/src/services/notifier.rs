use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::notification::DeviceToken;
use shared_store::Store;

use crate::models::RegisterDeviceTokenRequest;
use crate::services::push::PushGateway;

/// Best-effort, at-most-once push dispatch. Nothing here is ever surfaced
/// to the caller that triggered the notification.
pub struct Notifier {
    store: Arc<Store>,
    gateway: Arc<dyn PushGateway>,
}

impl Notifier {
    pub fn new(store: Arc<Store>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { store, gateway }
    }

    /// Multicast to every device registered for the recipient. Tokens the
    /// gateway reports as unregistered are deleted (duplicate deletes are
    /// idempotent no-ops).
    pub async fn notify(&self, recipient_id: Uuid, title: &str, body: &str) {
        let tokens = self
            .store
            .read(|state| state.tokens_for_user(recipient_id))
            .await;

        if tokens.is_empty() {
            debug!("No device tokens for user {}, skipping push", recipient_id);
            return;
        }

        let outcome = match self.gateway.send_multicast(&tokens, title, body).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Push send failed for user {}: {}", recipient_id, e);
                return;
            }
        };

        if outcome.failure_count > 0 {
            warn!(
                "Push to user {}: {} delivered, {} failed",
                recipient_id, outcome.success_count, outcome.failure_count
            );
        }

        if !outcome.unregistered_tokens.is_empty() {
            let stale = outcome.unregistered_tokens;
            let removed: Result<usize, AppError> = self
                .store
                .transaction(|state| {
                    let mut removed = 0;
                    for token in &stale {
                        if state.device_tokens.remove(token).is_some() {
                            removed += 1;
                        }
                    }
                    Ok(removed)
                })
                .await;

            match removed {
                Ok(count) => debug!("Pruned {} stale device tokens", count),
                Err(e) => error!("Failed to prune stale device tokens: {}", e),
            }
        }
    }

    /// Upsert keyed by token: a token re-registered by another account moves
    /// to that account.
    pub async fn register_device_token(
        &self,
        user_id: Uuid,
        request: RegisterDeviceTokenRequest,
    ) -> Result<DeviceToken, AppError> {
        if request.token.trim().is_empty() {
            return Err(AppError::BadRequest("Device token is required".to_string()));
        }

        self.store
            .transaction(|state| {
                let now = Utc::now();
                let record = state
                    .device_tokens
                    .entry(request.token.clone())
                    .and_modify(|existing| {
                        existing.user_id = user_id;
                        existing.platform = request.platform.clone();
                        existing.updated_at = now;
                    })
                    .or_insert_with(|| DeviceToken {
                        token: request.token.clone(),
                        user_id,
                        platform: request.platform.clone(),
                        created_at: now,
                        updated_at: now,
                    });
                Ok(record.clone())
            })
            .await
    }
}

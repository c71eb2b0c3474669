use huddle_domain::PushSubscription;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Payload delivered to every push endpoint of the target user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum PushDeliveryError {
    /// The push service reported the endpoint as permanently gone.
    /// The corresponding subscription should be pruned.
    #[error("Push endpoint is permanently gone")]
    Gone,
    #[error("Push delivery failed: {0}")]
    Transient(String),
}

#[async_trait::async_trait]
pub trait IPushTransport: Send + Sync {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> Result<(), PushDeliveryError>;
}

/// Delivers payloads over HTTP to the endpoint the browser handed out
/// when the user opted in
pub struct WebPushTransport {
    client: Client,
}

impl WebPushTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("To build push transport http client");
        Self { client }
    }
}

impl Default for WebPushTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushTransport for WebPushTransport {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> Result<(), PushDeliveryError> {
        let res = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", "60")
            .header("huddle-push-p256dh", &subscription.keys.p256dh)
            .header("huddle-push-auth", &subscription.keys.auth)
            .json(payload)
            .send()
            .await
            .map_err(|e| PushDeliveryError::Transient(e.to_string()))?;

        match res.status() {
            status if status.is_success() => Ok(()),
            StatusCode::GONE | StatusCode::NOT_FOUND => Err(PushDeliveryError::Gone),
            status => Err(PushDeliveryError::Transient(format!(
                "Push endpoint responded with status: {}",
                status
            ))),
        }
    }
}

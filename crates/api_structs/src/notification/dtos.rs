use huddle_domain::{PushSubscription, SubscriptionKeys};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionDTO {
    pub user_id: String,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub created: i64,
    pub updated: i64,
}

impl PushSubscriptionDTO {
    pub fn new(subscription: PushSubscription) -> Self {
        Self {
            user_id: subscription.user_id.as_string(),
            endpoint: subscription.endpoint,
            keys: subscription.keys,
            created: subscription.created,
            updated: subscription.updated,
        }
    }
}

/// Outcome of one delivery attempt against one push endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResultDTO {
    pub endpoint: String,
    pub success: bool,
    pub error: Option<String>,
}

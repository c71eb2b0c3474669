use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// Key material issued by the browser alongside a push endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser-issued push endpoint and its keys, enabling the server to
/// deliver a notification to that browser.
///
/// `(user_id, endpoint)` is unique: subscribing again with the same
/// endpoint rotates the keys in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PushSubscription {
    pub id: ID,
    pub user_id: ID,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub created: i64,
    pub updated: i64,
}

impl PushSubscription {
    pub fn new(user_id: ID, endpoint: String, keys: SubscriptionKeys, now: i64) -> Self {
        Self {
            id: Default::default(),
            user_id,
            endpoint,
            keys,
            created: now,
            updated: now,
        }
    }
}

impl Entity<ID> for PushSubscription {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

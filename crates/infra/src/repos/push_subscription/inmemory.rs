use super::IPushSubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use crate::repos::shared::repo::DeleteResult;
use huddle_domain::{PushSubscription, ID};
use std::sync::Mutex;

pub struct InMemoryPushSubscriptionRepo {
    subscriptions: Mutex<Vec<PushSubscription>>,
}

impl InMemoryPushSubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPushSubscriptionRepo for InMemoryPushSubscriptionRepo {
    async fn upsert(&self, subscription: &PushSubscription) -> anyhow::Result<()> {
        let updated = update_by(&self.subscriptions, |s| {
            if s.user_id == subscription.user_id && s.endpoint == subscription.endpoint {
                s.keys = subscription.keys.clone();
                s.updated = subscription.updated;
                true
            } else {
                false
            }
        });
        if updated == 0 {
            insert(subscription, &self.subscriptions);
        }
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<PushSubscription>> {
        Ok(find_by(&self.subscriptions, |s| &s.user_id == user_id))
    }

    async fn delete_by_endpoint(&self, user_id: &ID, endpoint: &str) -> Option<PushSubscription> {
        find_and_delete_by(&self.subscriptions, |s| {
            &s.user_id == user_id && s.endpoint == endpoint
        })
        .into_iter()
        .next()
    }

    async fn delete_by_user(&self, user_id: &ID) -> DeleteResult {
        delete_by(&self.subscriptions, |s| &s.user_id == user_id)
    }
}

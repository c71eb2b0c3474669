mod inmemory;
mod postgres;

pub use inmemory::InMemoryPushSubscriptionRepo;
pub use postgres::PostgresPushSubscriptionRepo;

use crate::repos::shared::repo::DeleteResult;
use huddle_domain::{PushSubscription, ID};

#[async_trait::async_trait]
pub trait IPushSubscriptionRepo: Send + Sync {
    /// Inserts the subscription, or rotates the stored keys when the
    /// `(user_id, endpoint)` pair already exists
    async fn upsert(&self, subscription: &PushSubscription) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<PushSubscription>>;
    async fn delete_by_endpoint(&self, user_id: &ID, endpoint: &str) -> Option<PushSubscription>;
    async fn delete_by_user(&self, user_id: &ID) -> DeleteResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup_context_inmemory;
    use huddle_domain::SubscriptionKeys;

    fn keys(auth: &str) -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: "BNcRd...".into(),
            auth: auth.into(),
        }
    }

    #[tokio::test]
    async fn upsert_with_same_endpoint_rotates_keys() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();
        let endpoint = "https://push.example.com/sub/1";

        let subscription =
            PushSubscription::new(user_id.clone(), endpoint.into(), keys("old"), 0);
        ctx.repos
            .push_subscriptions
            .upsert(&subscription)
            .await
            .unwrap();

        let rotated = PushSubscription::new(user_id.clone(), endpoint.into(), keys("new"), 10);
        ctx.repos.push_subscriptions.upsert(&rotated).await.unwrap();

        let found = ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keys.auth, "new");
    }

    #[tokio::test]
    async fn delete_by_endpoint_only_removes_that_endpoint() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();

        for endpoint in ["https://push.example.com/a", "https://push.example.com/b"] {
            let subscription =
                PushSubscription::new(user_id.clone(), endpoint.into(), keys("k"), 0);
            ctx.repos
                .push_subscriptions
                .upsert(&subscription)
                .await
                .unwrap();
        }

        let deleted = ctx
            .repos
            .push_subscriptions
            .delete_by_endpoint(&user_id, "https://push.example.com/a")
            .await;
        assert!(deleted.is_some());

        let found = ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].endpoint, "https://push.example.com/b");
    }

    #[tokio::test]
    async fn delete_by_user_removes_all_endpoints_of_that_user() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();
        let other_user_id = ID::default();

        for endpoint in ["https://push.example.com/a", "https://push.example.com/b"] {
            let subscription =
                PushSubscription::new(user_id.clone(), endpoint.into(), keys("k"), 0);
            ctx.repos
                .push_subscriptions
                .upsert(&subscription)
                .await
                .unwrap();
        }
        let other = PushSubscription::new(
            other_user_id.clone(),
            "https://push.example.com/c".into(),
            keys("k"),
            0,
        );
        ctx.repos.push_subscriptions.upsert(&other).await.unwrap();

        let res = ctx.repos.push_subscriptions.delete_by_user(&user_id).await;
        assert_eq!(res.deleted_count, 2);
        assert!(ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            ctx.repos
                .push_subscriptions
                .find_by_user(&other_user_id)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}

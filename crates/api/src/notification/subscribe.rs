use super::subscription_cache_key;
use crate::error::HuddleError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use huddle_api_structs::subscribe::{APIResponse, RequestBody};
use huddle_domain::{PushSubscription, SubscriptionKeys, ID};
use huddle_infra::HuddleContext;
use tracing::error;

pub async fn subscribe_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, HuddleError> {
    let user = protect_route(&http_req, &ctx).await?;

    let body = body.into_inner();
    let usecase = SubscribeUseCase {
        user_id: user.id,
        endpoint: body.endpoint,
        keys: body.keys,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(HuddleError::from)
}

/// Registers (or refreshes) a push endpoint for the authenticated user.
/// The browser rotates endpoints and keys, so an existing endpoint is
/// upserted rather than rejected.
#[derive(Debug)]
pub struct SubscribeUseCase {
    pub user_id: ID,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyEndpoint,
    StorageError,
}

impl From<UseCaseError> for HuddleError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyEndpoint => {
                Self::BadClientData("The endpoint of a push subscription cannot be empty".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for SubscribeUseCase {
    type Response = PushSubscription;

    type Error = UseCaseError;

    const NAME: &'static str = "SubscribeToPushNotifications";

    async fn execute(&mut self, ctx: &HuddleContext) -> Result<Self::Response, Self::Error> {
        if self.endpoint.trim().is_empty() {
            return Err(UseCaseError::EmptyEndpoint);
        }

        let subscription = PushSubscription::new(
            self.user_id.clone(),
            self.endpoint.clone(),
            self.keys.clone(),
            ctx.sys.get_timestamp_millis(),
        );

        ctx.repos
            .push_subscriptions
            .upsert(&subscription)
            .await
            .map_err(|e| {
                error!(
                    "Unable to store push subscription for user: {}. Error: {:?}",
                    self.user_id, e
                );
                UseCaseError::StorageError
            })?;

        Ok(subscription)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(InvalidateSubscriptionCache)]
    }
}

/// Memoized subscription lookups for the user are stale after a new
/// registration, drop them so the next send sees the new endpoint
pub struct InvalidateSubscriptionCache;

#[async_trait::async_trait]
impl Subscriber<SubscribeUseCase> for InvalidateSubscriptionCache {
    async fn notify(&self, e: &PushSubscription, ctx: &HuddleContext) {
        ctx.subscription_cache
            .clear_by_pattern(&subscription_cache_key(&e.user_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_infra::setup_context_inmemory;

    fn keys() -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: "BNcRd...".into(),
            auth: "tBHI...".into(),
        }
    }

    #[tokio::test]
    async fn rejects_empty_endpoint() {
        let ctx = setup_context_inmemory();
        let usecase = SubscribeUseCase {
            user_id: ID::default(),
            endpoint: "  ".into(),
            keys: keys(),
        };
        assert!(matches!(
            execute(usecase, &ctx).await,
            Err(UseCaseError::EmptyEndpoint)
        ));
    }

    #[tokio::test]
    async fn stores_subscription_and_invalidates_cached_lookups() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();
        // A stale cached lookup from before the registration
        ctx.subscription_cache
            .set(&subscription_cache_key(&user_id), Vec::new());

        let usecase = SubscribeUseCase {
            user_id: user_id.clone(),
            endpoint: "https://push.example.com/abc".into(),
            keys: keys(),
        };
        execute(usecase, &ctx).await.expect("To subscribe");

        let stored = ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].endpoint, "https://push.example.com/abc");
        assert!(!ctx
            .subscription_cache
            .has(&subscription_cache_key(&user_id)));
    }

    #[tokio::test]
    async fn subscribing_same_endpoint_twice_rotates_keys() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();
        let endpoint = "https://push.example.com/abc";

        for p256dh in ["first", "second"] {
            let usecase = SubscribeUseCase {
                user_id: user_id.clone(),
                endpoint: endpoint.into(),
                keys: SubscriptionKeys {
                    p256dh: p256dh.into(),
                    auth: "tBHI...".into(),
                },
            };
            execute(usecase, &ctx).await.expect("To subscribe");
        }

        let stored = ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].keys.p256dh, "second");
    }
}

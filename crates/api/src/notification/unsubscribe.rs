use super::subscription_cache_key;
use crate::error::HuddleError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use huddle_api_structs::unsubscribe::{APIResponse, RequestBody};
use huddle_domain::ID;
use huddle_infra::HuddleContext;
use tracing::info;

pub async fn unsubscribe_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, HuddleError> {
    let user = protect_route(&http_req, &ctx).await?;

    let usecase = UnsubscribeUseCase {
        user_id: user.id,
        endpoint: body.into_inner().endpoint,
    };

    execute(usecase, &ctx)
        .await
        .map(|_| HttpResponse::Ok().json(APIResponse { success: true }))
        .map_err(HuddleError::from)
}

/// Removes a push endpoint for the authenticated user. Unsubscribing an
/// endpoint that is already gone still succeeds, the client only cares
/// that the endpoint no longer receives notifications.
#[derive(Debug)]
pub struct UnsubscribeUseCase {
    pub user_id: ID,
    pub endpoint: String,
}

#[derive(Debug)]
pub struct UnsubscribeResponse {
    pub user_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for HuddleError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait]
impl UseCase for UnsubscribeUseCase {
    type Response = UnsubscribeResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "UnsubscribeFromPushNotifications";

    async fn execute(&mut self, ctx: &HuddleContext) -> Result<Self::Response, Self::Error> {
        let deleted = ctx
            .repos
            .push_subscriptions
            .delete_by_endpoint(&self.user_id, &self.endpoint)
            .await;
        if deleted.is_none() {
            info!(
                "Unsubscribe for user: {} matched no stored endpoint",
                self.user_id
            );
        }

        Ok(UnsubscribeResponse {
            user_id: self.user_id.clone(),
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(InvalidateSubscriptionCache)]
    }
}

pub struct InvalidateSubscriptionCache;

#[async_trait::async_trait]
impl Subscriber<UnsubscribeUseCase> for InvalidateSubscriptionCache {
    async fn notify(&self, e: &UnsubscribeResponse, ctx: &HuddleContext) {
        ctx.subscription_cache
            .clear_by_pattern(&subscription_cache_key(&e.user_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_domain::{PushSubscription, SubscriptionKeys};
    use huddle_infra::setup_context_inmemory;

    #[tokio::test]
    async fn removes_the_matching_endpoint_and_invalidates_cache() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();
        let subscription = PushSubscription::new(
            user_id.clone(),
            "https://push.example.com/abc".into(),
            SubscriptionKeys {
                p256dh: "BNcRd...".into(),
                auth: "tBHI...".into(),
            },
            0,
        );
        ctx.repos
            .push_subscriptions
            .upsert(&subscription)
            .await
            .unwrap();
        ctx.subscription_cache
            .set(&subscription_cache_key(&user_id), vec![subscription]);

        let usecase = UnsubscribeUseCase {
            user_id: user_id.clone(),
            endpoint: "https://push.example.com/abc".into(),
        };
        execute(usecase, &ctx).await.expect("To unsubscribe");

        assert!(ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap()
            .is_empty());
        assert!(!ctx
            .subscription_cache
            .has(&subscription_cache_key(&user_id)));
    }

    #[tokio::test]
    async fn unknown_endpoint_still_succeeds() {
        let ctx = setup_context_inmemory();
        let usecase = UnsubscribeUseCase {
            user_id: ID::default(),
            endpoint: "https://push.example.com/never-registered".into(),
        };
        assert!(execute(usecase, &ctx).await.is_ok());
    }
}

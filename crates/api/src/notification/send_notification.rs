use super::subscription_cache_key;
use crate::error::HuddleError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use futures::future::join_all;
use huddle_api_structs::dtos::DeliveryResultDTO;
use huddle_api_structs::send_notification::{APIResponse, RequestBody};
use huddle_domain::ID;
use huddle_infra::{HuddleContext, PushDeliveryError, PushPayload};
use tracing::error;

pub async fn send_notification_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, HuddleError> {
    let _user = protect_route(&http_req, &ctx).await?;

    let body = body.into_inner();
    let usecase = SendNotificationUseCase {
        user_id: body.user_id,
        title: body.title,
        body: body.body,
        data: body.data,
    };

    execute(usecase, &ctx)
        .await
        .map(|summary| {
            HttpResponse::Ok().json(APIResponse::new(
                summary.sent,
                summary.failed,
                summary.results,
            ))
        })
        .map_err(HuddleError::from)
}

/// Delivers a payload to every push endpoint registered for the target
/// user and prunes the endpoints the transport reports as gone.
#[derive(Debug)]
pub struct SendNotificationUseCase {
    pub user_id: ID,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct DeliverySummary {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<DeliveryResultDTO>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NoSubscriptions(ID),
    StorageError,
}

impl From<UseCaseError> for HuddleError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NoSubscriptions(user_id) => Self::NotFound(format!(
                "No push subscriptions registered for user: {}",
                user_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for SendNotificationUseCase {
    type Response = DeliverySummary;

    type Error = UseCaseError;

    const NAME: &'static str = "SendNotification";

    async fn execute(&mut self, ctx: &HuddleContext) -> Result<Self::Response, Self::Error> {
        let cache_key = subscription_cache_key(&self.user_id);
        let user_id = self.user_id.clone();
        let repos = ctx.repos.clone();
        let subscriptions = ctx
            .subscription_cache
            .memoize(&cache_key, None, || async move {
                repos.push_subscriptions.find_by_user(&user_id).await
            })
            .await
            .map_err(|e| {
                error!(
                    "Unable to query push subscriptions for user: {}. Error: {:?}",
                    self.user_id, e
                );
                UseCaseError::StorageError
            })?;

        if subscriptions.is_empty() {
            return Err(UseCaseError::NoSubscriptions(self.user_id.clone()));
        }

        let payload = PushPayload {
            title: self.title.clone(),
            body: self.body.clone(),
            data: self.data.clone(),
        };

        // One delivery future per endpoint. Failures are collected per
        // endpoint and never cancel or fail the sibling deliveries.
        let payload_ref = &payload;
        let deliveries = subscriptions.iter().map(|subscription| async move {
            (
                subscription,
                ctx.push.deliver(subscription, payload_ref).await,
            )
        });
        let outcomes = join_all(deliveries).await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut sent = 0;
        let mut pruned = false;
        for (subscription, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    sent += 1;
                    results.push(DeliveryResultDTO {
                        endpoint: subscription.endpoint.clone(),
                        success: true,
                        error: None,
                    });
                }
                Err(e) => {
                    if let PushDeliveryError::Gone = e {
                        ctx.repos
                            .push_subscriptions
                            .delete_by_endpoint(&self.user_id, &subscription.endpoint)
                            .await;
                        pruned = true;
                    }
                    results.push(DeliveryResultDTO {
                        endpoint: subscription.endpoint.clone(),
                        success: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        if pruned {
            ctx.subscription_cache.clear_by_pattern(&cache_key);
        }

        let failed = results.len() - sent;
        Ok(DeliverySummary {
            sent,
            failed,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_domain::{PushSubscription, SubscriptionKeys};
    use huddle_infra::{setup_context_inmemory, IPushTransport};
    use std::sync::Arc;

    /// Succeeds everywhere except for the configured gone endpoint
    struct GoneEndpointTransport {
        gone_endpoint: String,
    }

    #[async_trait::async_trait]
    impl IPushTransport for GoneEndpointTransport {
        async fn deliver(
            &self,
            subscription: &PushSubscription,
            _payload: &PushPayload,
        ) -> Result<(), PushDeliveryError> {
            if subscription.endpoint == self.gone_endpoint {
                Err(PushDeliveryError::Gone)
            } else {
                Ok(())
            }
        }
    }

    fn keys() -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: "BNcRd...".into(),
            auth: "tBHI...".into(),
        }
    }

    fn usecase_for(user_id: &ID) -> SendNotificationUseCase {
        SendNotificationUseCase {
            user_id: user_id.clone(),
            title: "Lunch plans".into(),
            body: "Group lunch in 10 minutes".into(),
            data: None,
        }
    }

    #[tokio::test]
    async fn no_subscriptions_is_not_found_and_leaves_no_side_effects() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();

        let res = execute(usecase_for(&user_id), &ctx).await;
        match res {
            Err(UseCaseError::NoSubscriptions(id)) => assert_eq!(id, user_id),
            other => panic!("Expected NoSubscriptions but got: {:?}", other),
        }
        assert!(ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn gone_endpoint_is_pruned_and_counted_as_failed() {
        let mut ctx = setup_context_inmemory();
        let user_id = ID::default();
        let gone_endpoint = "https://push.example.com/gone";
        ctx.push = Arc::new(GoneEndpointTransport {
            gone_endpoint: gone_endpoint.into(),
        });

        for endpoint in ["https://push.example.com/alive", gone_endpoint] {
            let subscription =
                PushSubscription::new(user_id.clone(), endpoint.into(), keys(), 0);
            ctx.repos
                .push_subscriptions
                .upsert(&subscription)
                .await
                .unwrap();
        }

        let summary = execute(usecase_for(&user_id), &ctx)
            .await
            .expect("Delivery summary");
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results.len(), 2);

        let remaining = ctx
            .repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].endpoint, "https://push.example.com/alive");
    }

    #[tokio::test]
    async fn all_failed_deliveries_still_produce_a_summary() {
        let mut ctx = setup_context_inmemory();
        let user_id = ID::default();
        let gone_endpoint = "https://push.example.com/gone";
        ctx.push = Arc::new(GoneEndpointTransport {
            gone_endpoint: gone_endpoint.into(),
        });

        let subscription =
            PushSubscription::new(user_id.clone(), gone_endpoint.into(), keys(), 0);
        ctx.repos
            .push_subscriptions
            .upsert(&subscription)
            .await
            .unwrap();

        let summary = execute(usecase_for(&user_id), &ctx)
            .await
            .expect("Delivery summary");
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.failed, 1);
    }
}

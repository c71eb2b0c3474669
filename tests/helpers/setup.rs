use huddle_api::{Application, ReminderScheduler};
use huddle_domain::PushSubscription;
use huddle_infra::{
    setup_context_inmemory, HuddleContext, IPushTransport, PushDeliveryError, PushPayload,
};
use std::sync::Arc;

pub struct TestApp {
    pub ctx: HuddleContext,
    pub scheduler: Arc<ReminderScheduler>,
}

/// Push transport stub for integration tests. Deliveries succeed unless
/// the endpoint is listed as gone.
pub struct StubPushTransport {
    gone_endpoints: Vec<String>,
}

#[async_trait::async_trait]
impl IPushTransport for StubPushTransport {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        _payload: &PushPayload,
    ) -> Result<(), PushDeliveryError> {
        if self.gone_endpoints.contains(&subscription.endpoint) {
            Err(PushDeliveryError::Gone)
        } else {
            Ok(())
        }
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, String) {
    spawn_app_with_gone_endpoints(Vec::new()).await
}

pub async fn spawn_app_with_gone_endpoints(gone_endpoints: Vec<String>) -> (TestApp, String) {
    let mut ctx = setup_context_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.jwt_secret = "test-secret".into();
    ctx.push = Arc::new(StubPushTransport { gone_endpoints });

    let app_ctx = ctx.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let scheduler = application.scheduler();
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    (
        TestApp {
            ctx: app_ctx,
            scheduler,
        },
        address,
    )
}

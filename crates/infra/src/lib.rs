mod cache;
mod config;
mod repos;
mod services;
mod system;

pub use cache::{Cache, DEFAULT_CACHE_TTL};
pub use config::Config;
pub use repos::{DeleteResult, IPushSubscriptionRepo, IReminderRepo, IUserRepo, Repos};
pub use services::{IPushTransport, PushDeliveryError, PushPayload, WebPushTransport};
pub use system::ISys;

use huddle_domain::PushSubscription;
use std::sync::Arc;
use system::RealSys;

#[derive(Clone)]
pub struct HuddleContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub push: Arc<dyn IPushTransport>,
    /// Memoizes subscription lookups, keyed "subscriptions:{user_id}".
    /// Invalidated on subscribe / unsubscribe / prune.
    pub subscription_cache: Arc<Cache<Vec<PushSubscription>>>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl HuddleContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            push: Arc::new(WebPushTransport::new()),
            subscription_cache: Arc::new(Cache::new()),
        }
    }

    fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            push: Arc::new(WebPushTransport::new()),
            subscription_cache: Arc::new(Cache::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> HuddleContext {
    HuddleContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

/// Context backed by in-memory repositories, used by tests
pub fn setup_context_inmemory() -> HuddleContext {
    HuddleContext::create_inmemory()
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

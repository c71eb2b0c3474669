use crate::dtos::{DeliveryResultDTO, PushSubscriptionDTO};
use huddle_domain::{PushSubscription, SubscriptionKeys, ID};
use serde::{Deserialize, Serialize};

pub mod send_notification {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: ID,
        pub title: String,
        pub body: String,
        pub data: Option<serde_json::Value>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        pub sent: usize,
        pub failed: usize,
        pub results: Vec<DeliveryResultDTO>,
    }

    impl APIResponse {
        pub fn new(sent: usize, failed: usize, results: Vec<DeliveryResultDTO>) -> Self {
            Self {
                success: true,
                sent,
                failed,
                results,
            }
        }
    }
}

pub mod subscribe {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub endpoint: String,
        pub keys: SubscriptionKeys,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        pub subscription: PushSubscriptionDTO,
    }

    impl APIResponse {
        pub fn new(subscription: PushSubscription) -> Self {
            Self {
                success: true,
                subscription: PushSubscriptionDTO::new(subscription),
            }
        }
    }
}

pub mod unsubscribe {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub endpoint: String,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
    }
}

mod push;

pub use push::{IPushTransport, PushDeliveryError, PushPayload, WebPushTransport};

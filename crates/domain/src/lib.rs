mod push_subscription;
mod reminder;
mod shared;
mod user;

pub use push_subscription::{PushSubscription, SubscriptionKeys};
pub use reminder::{NotificationType, Reminder};
pub use shared::entity::{Entity, ID};
pub use user::User;

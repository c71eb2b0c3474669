use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// How a `Reminder` should reach its owner when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    Push,
    Email,
    Both,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Email => "email",
            Self::Both => "both",
        }
    }

    /// Whether firing this reminder should go through the push transport
    pub fn wants_push(&self) -> bool {
        matches!(self, Self::Push | Self::Both)
    }
}

#[derive(Error, Debug)]
pub enum InvalidNotificationTypeError {
    #[error("Notification type: {0} is not known")]
    Unknown(String),
}

impl FromStr for NotificationType {
    type Err = InvalidNotificationTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(Self::Push),
            "email" => Ok(Self::Email),
            "both" => Ok(Self::Both),
            _ => Err(InvalidNotificationTypeError::Unknown(s.to_string())),
        }
    }
}

/// A `Reminder` is a user-scheduled intent to be notified about an
/// event at a specific time.
///
/// `is_sent` transitions false -> true exactly once and never reverts,
/// so a reminder is delivered at most once per firing.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The event this `Reminder` points at
    pub event_id: ID,
    /// The `User` that owns this `Reminder` and will be notified
    pub user_id: ID,
    pub title: String,
    pub message: Option<String>,
    /// The timestamp in millis at which the owner should be notified
    pub remind_at: i64,
    pub notification_type: NotificationType,
    pub is_sent: bool,
    pub created: i64,
    pub updated: i64,
}

impl Reminder {
    pub fn new(
        event_id: ID,
        user_id: ID,
        title: String,
        message: Option<String>,
        remind_at: i64,
        notification_type: NotificationType,
        now: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            event_id,
            user_id,
            title,
            message,
            remind_at,
            notification_type,
            is_sent: false,
            created: now,
            updated: now,
        }
    }
}

impl Entity<ID> for Reminder {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

use huddle_domain::{NotificationType, Reminder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub title: String,
    pub message: Option<String>,
    pub remind_at: i64,
    pub notification_type: NotificationType,
    pub is_sent: bool,
    pub created: i64,
    pub updated: i64,
}

impl ReminderDTO {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            id: reminder.id.as_string(),
            event_id: reminder.event_id.as_string(),
            user_id: reminder.user_id.as_string(),
            title: reminder.title,
            message: reminder.message,
            remind_at: reminder.remind_at,
            notification_type: reminder.notification_type,
            is_sent: reminder.is_sent,
            created: reminder.created,
            updated: reminder.updated,
        }
    }
}

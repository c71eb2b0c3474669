use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use huddle_domain::{Reminder, ID};
use std::sync::Mutex;

pub struct InMemoryReminderRepo {
    reminders: Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_pending_by_user(&self, user_id: &ID) -> Vec<Reminder> {
        find_by(&self.reminders, |r| &r.user_id == user_id && !r.is_sent)
    }

    async fn find_due(&self, before: i64) -> Vec<Reminder> {
        find_by(&self.reminders, |r| !r.is_sent && r.remind_at <= before)
    }

    async fn mark_sent(&self, reminder_id: &ID, now: i64) -> anyhow::Result<()> {
        update_by(&self.reminders, |r| {
            if &r.id == reminder_id && !r.is_sent {
                r.is_sent = true;
                r.updated = now;
                true
            } else {
                false
            }
        });
        Ok(())
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        delete(reminder_id, &self.reminders)
    }
}

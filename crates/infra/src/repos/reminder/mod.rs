mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;

use huddle_domain::{Reminder, ID};

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    /// All reminders for `user_id` that have not been sent yet.
    /// Store errors are logged and swallowed into an empty result so
    /// the scheduling path never blocks the caller.
    async fn find_pending_by_user(&self, user_id: &ID) -> Vec<Reminder>;
    /// All unsent reminders due at or before `before` (millis)
    async fn find_due(&self, before: i64) -> Vec<Reminder>;
    /// Flips `is_sent` to true. Rows already sent are left untouched,
    /// which keeps the fire-at-most-once invariant at the store.
    async fn mark_sent(&self, reminder_id: &ID, now: i64) -> anyhow::Result<()>;
    async fn delete(&self, reminder_id: &ID) -> Option<Reminder>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup_context_inmemory;
    use huddle_domain::NotificationType;

    fn reminder_factory(user_id: &ID, remind_at: i64) -> Reminder {
        Reminder::new(
            Default::default(),
            user_id.clone(),
            "Standup".into(),
            None,
            remind_at,
            NotificationType::Push,
            0,
        )
    }

    #[tokio::test]
    async fn pending_excludes_sent_reminders() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();

        let reminder = reminder_factory(&user_id, 100);
        ctx.repos.reminders.insert(&reminder).await.unwrap();
        assert_eq!(ctx.repos.reminders.find_pending_by_user(&user_id).await.len(), 1);

        ctx.repos.reminders.mark_sent(&reminder.id, 50).await.unwrap();
        assert!(ctx.repos.reminders.find_pending_by_user(&user_id).await.is_empty());

        let found = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert!(found.is_sent);
    }

    #[tokio::test]
    async fn find_due_only_returns_overdue_unsent() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();

        let due = reminder_factory(&user_id, 100);
        let upcoming = reminder_factory(&user_id, 10_000);
        let sent = reminder_factory(&user_id, 50);
        ctx.repos.reminders.insert(&due).await.unwrap();
        ctx.repos.reminders.insert(&upcoming).await.unwrap();
        ctx.repos.reminders.insert(&sent).await.unwrap();
        ctx.repos.reminders.mark_sent(&sent.id, 60).await.unwrap();

        let found = ctx.repos.reminders.find_due(1000).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due.id);
    }

    #[tokio::test]
    async fn delete_removes_reminder() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();

        let reminder = reminder_factory(&user_id, 100);
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let deleted = ctx.repos.reminders.delete(&reminder.id).await.unwrap();
        assert_eq!(deleted.id, reminder.id);
        assert!(ctx.repos.reminders.find(&reminder.id).await.is_none());
        assert!(ctx.repos.reminders.delete(&reminder.id).await.is_none());
    }
}

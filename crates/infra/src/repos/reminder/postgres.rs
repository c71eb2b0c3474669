use super::IReminderRepo;
use huddle_domain::{NotificationType, Reminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    event_uid: Uuid,
    user_uid: Uuid,
    title: String,
    message: Option<String>,
    remind_at: i64,
    notification_type: String,
    is_sent: bool,
    created: i64,
    updated: i64,
}

impl From<ReminderRaw> for Reminder {
    fn from(raw: ReminderRaw) -> Self {
        Self {
            id: raw.reminder_uid.into(),
            event_id: raw.event_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            message: raw.message,
            remind_at: raw.remind_at,
            notification_type: raw
                .notification_type
                .parse()
                .unwrap_or(NotificationType::Push),
            is_sent: raw.is_sent,
            created: raw.created,
            updated: raw.updated,
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, event_uid, user_uid, title, message, remind_at, notification_type, is_sent, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.event_id.inner_ref())
        .bind(reminder.user_id.inner_ref())
        .bind(&reminder.title)
        .bind(&reminder.message)
        .bind(reminder.remind_at)
        .bind(reminder.notification_type.as_str())
        .bind(reminder.is_sent)
        .bind(reminder.created)
        .bind(reminder.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|reminder| reminder.into())
    }

    async fn find_pending_by_user(&self, user_id: &ID) -> Vec<Reminder> {
        match sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.user_uid = $1 AND r.is_sent = FALSE
            ORDER BY r.remind_at
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        {
            Ok(reminders) => reminders.into_iter().map(|r| r.into()).collect(),
            Err(e) => {
                error!(
                    "Unable to query pending reminders for user: {}. Error: {:?}",
                    user_id, e
                );
                Vec::new()
            }
        }
    }

    async fn find_due(&self, before: i64) -> Vec<Reminder> {
        match sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.is_sent = FALSE AND r.remind_at <= $1
            ORDER BY r.remind_at
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        {
            Ok(reminders) => reminders.into_iter().map(|r| r.into()).collect(),
            Err(e) => {
                error!("Unable to query due reminders. Error: {:?}", e);
                Vec::new()
            }
        }
    }

    async fn mark_sent(&self, reminder_id: &ID, now: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders
            SET is_sent = TRUE, updated = $2
            WHERE reminder_uid = $1 AND is_sent = FALSE
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            DELETE FROM reminders AS r
            WHERE r.reminder_uid = $1
            RETURNING *
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|reminder| reminder.into())
    }
}

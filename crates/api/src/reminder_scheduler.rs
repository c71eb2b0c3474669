use crate::notification::send_notification::{SendNotificationUseCase, UseCaseError};
use crate::shared::usecase::execute;
use huddle_domain::{NotificationType, Reminder, ID};
use huddle_infra::HuddleContext;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

struct ArmedTimer {
    user_id: ID,
    handle: JoinHandle<()>,
}

/// Arms one in-process timer per pending `Reminder` and turns it into a
/// push notification when it elapses.
///
/// Timers live in the process only, the store is the source of truth:
/// a timer that fires always re-reads its reminder and a reminder whose
/// `is_sent` flag is already set never fires again. Restarts recover
/// through `load_and_schedule` and the `reconcile` sweep at startup.
pub struct ReminderScheduler {
    ctx: HuddleContext,
    timers: Mutex<HashMap<ID, ArmedTimer>>,
}

impl ReminderScheduler {
    pub fn new(ctx: HuddleContext) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            timers: Mutex::new(HashMap::new()),
        })
    }

    /// Loads every pending reminder of `user_id` and arms a timer for
    /// each. Reminders that are already overdue fire immediately
    /// instead of being armed.
    ///
    /// Calling this twice for the same user is safe: existing timers
    /// for the user are dropped first, so each pending reminder ends up
    /// with exactly one armed timer. Returns the number of reminders
    /// processed, armed or fired.
    pub async fn load_and_schedule(self: &Arc<Self>, user_id: &ID) -> usize {
        self.cleanup(user_id);

        let now = self.ctx.sys.get_timestamp_millis();
        let pending = self.ctx.repos.reminders.find_pending_by_user(user_id).await;
        info!(
            "Scheduling {} pending reminders for user: {}",
            pending.len(),
            user_id
        );

        let mut processed = 0;
        for reminder in pending {
            if reminder.remind_at <= now {
                self.fire(&reminder.id).await;
            } else {
                self.arm(reminder, now);
            }
            processed += 1;
        }
        processed
    }

    /// Fires every overdue reminder that is still unsent, regardless of
    /// owner. Run once at startup to catch reminders that elapsed while
    /// the process was down.
    pub async fn reconcile(self: &Arc<Self>) {
        let now = self.ctx.sys.get_timestamp_millis();
        let due = self.ctx.repos.reminders.find_due(now).await;
        if due.is_empty() {
            return;
        }
        info!("Reconciling {} overdue reminders", due.len());
        for reminder in due {
            self.fire(&reminder.id).await;
        }
    }

    /// Disarms the timer for one reminder, used when the reminder is
    /// deleted. A reminder with no armed timer is a no-op.
    pub fn cancel(&self, reminder_id: &ID) {
        if let Some(timer) = self.timers.lock().unwrap().remove(reminder_id) {
            timer.handle.abort();
        }
    }

    /// Disarms every timer owned by `user_id`
    pub fn cleanup(&self, user_id: &ID) {
        let mut timers = self.timers.lock().unwrap();
        timers.retain(|_, timer| {
            if &timer.user_id == user_id {
                timer.handle.abort();
                false
            } else {
                true
            }
        });
    }

    /// Disarms every timer, used on graceful shutdown. Unsent reminders
    /// are picked up again by `reconcile` on the next start.
    pub fn shutdown(&self) {
        let mut timers = self.timers.lock().unwrap();
        for (_, timer) in timers.drain() {
            timer.handle.abort();
        }
    }

    /// Number of armed timers for `user_id`
    pub fn armed_timers(&self, user_id: &ID) -> usize {
        self.timers
            .lock()
            .unwrap()
            .values()
            .filter(|timer| &timer.user_id == user_id)
            .count()
    }

    fn arm(self: &Arc<Self>, reminder: Reminder, now: i64) {
        let delay = (reminder.remind_at - now).max(0) as u64;
        let reminder_id = reminder.id.clone();
        let scheduler = Arc::clone(self);

        // The lock is held across the spawn so the timer task's removal
        // of its map entry cannot run before the entry is inserted.
        let mut timers = self.timers.lock().unwrap();
        let handle = tokio::spawn({
            let reminder_id = reminder_id.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                scheduler.timers.lock().unwrap().remove(&reminder_id);
                scheduler.fire(&reminder_id).await;
            }
        });

        if let Some(replaced) = timers.insert(
            reminder_id,
            ArmedTimer {
                user_id: reminder.user_id,
                handle,
            },
        ) {
            replaced.handle.abort();
        }
    }

    /// Delivers one reminder and marks it sent when the delivery
    /// reached the owner. The reminder is re-read from the store so a
    /// deletion or a concurrent firing between arming and elapsing is
    /// seen here. The re-read narrows but does not close the window in
    /// which two concurrent fires of the same reminder both deliver;
    /// `mark_sent` keeps the flag itself single-shot.
    async fn fire(&self, reminder_id: &ID) {
        let reminder = match self.ctx.repos.reminders.find(reminder_id).await {
            Some(reminder) => reminder,
            None => return,
        };
        if reminder.is_sent {
            return;
        }

        let mut push_delivered = false;

        if reminder.notification_type.wants_push() {
            let usecase = SendNotificationUseCase {
                user_id: reminder.user_id.clone(),
                title: reminder.title.clone(),
                body: reminder
                    .message
                    .clone()
                    .unwrap_or_else(|| reminder.title.clone()),
                data: Some(json!({
                    "eventId": reminder.event_id.as_string(),
                    "reminderId": reminder.id.as_string(),
                })),
            };
            match execute(usecase, &self.ctx).await {
                Ok(summary) => {
                    push_delivered = summary.sent > 0;
                }
                Err(UseCaseError::NoSubscriptions(user_id)) => {
                    warn!(
                        "Reminder: {} fired but user: {} has no push subscriptions",
                        reminder.id, user_id
                    );
                }
                Err(e) => {
                    error!("Unable to deliver reminder: {}. Error: {:?}", reminder.id, e);
                }
            }
        }

        if matches!(
            reminder.notification_type,
            NotificationType::Email | NotificationType::Both
        ) {
            // No mail transport is configured, the email leg is only
            // logged.
            warn!(
                "Reminder: {} requested email delivery which is not available",
                reminder.id
            );
        }

        // Email-only reminders have no deliverable leg and are marked
        // sent so they do not refire forever. A `both` reminder whose
        // push failed stays unsent and is retried on the next reload.
        let delivered = match reminder.notification_type {
            NotificationType::Email => true,
            NotificationType::Push | NotificationType::Both => push_delivered,
        };

        if delivered {
            let now = self.ctx.sys.get_timestamp_millis();
            if let Err(e) = self.ctx.repos.reminders.mark_sent(&reminder.id, now).await {
                error!(
                    "Unable to mark reminder: {} as sent. Error: {:?}",
                    reminder.id, e
                );
            }
        }
    }
}

use crate::error::HuddleError;
use crate::reminder_scheduler::ReminderScheduler;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use huddle_api_structs::delete_reminder::{APIResponse, PathParams};
use huddle_domain::{Reminder, ID};
use huddle_infra::HuddleContext;

pub async fn delete_reminder_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
    scheduler: web::Data<ReminderScheduler>,
    path_params: web::Path<PathParams>,
) -> Result<HttpResponse, HuddleError> {
    let user = protect_route(&http_req, &ctx).await?;

    let reminder_id = path_params.reminder_id.clone();
    let usecase = DeleteReminderUseCase {
        user_id: user.id,
        reminder_id: reminder_id.clone(),
    };

    let reminder = execute(usecase, &ctx).await.map_err(HuddleError::from)?;
    // The row is gone, a still armed timer for it must not fire
    scheduler.cancel(&reminder_id);

    Ok(HttpResponse::Ok().json(APIResponse::new(reminder)))
}

/// Deletes one reminder owned by the authenticated user. Reminders of
/// other users are reported as not found, never as forbidden.
#[derive(Debug)]
pub struct DeleteReminderUseCase {
    pub user_id: ID,
    pub reminder_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for HuddleError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {} was not found",
                reminder_id
            )),
        }
    }
}

#[async_trait::async_trait]
impl UseCase for DeleteReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteReminder";

    async fn execute(&mut self, ctx: &HuddleContext) -> Result<Self::Response, Self::Error> {
        let reminder = ctx.repos.reminders.find(&self.reminder_id).await;
        match reminder {
            Some(reminder) if reminder.user_id == self.user_id => {
                ctx.repos.reminders.delete(&self.reminder_id).await;
                Ok(reminder)
            }
            _ => Err(UseCaseError::NotFound(self.reminder_id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_domain::NotificationType;
    use huddle_infra::setup_context_inmemory;

    fn reminder_for(user_id: &ID) -> Reminder {
        Reminder::new(
            Default::default(),
            user_id.clone(),
            "Standup".into(),
            None,
            5_000,
            NotificationType::Push,
            0,
        )
    }

    #[tokio::test]
    async fn deletes_own_reminder() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();
        let reminder = reminder_for(&user_id);
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let usecase = DeleteReminderUseCase {
            user_id,
            reminder_id: reminder.id.clone(),
        };
        let deleted = execute(usecase, &ctx).await.expect("To delete reminder");
        assert_eq!(deleted.id, reminder.id);
        assert!(ctx.repos.reminders.find(&reminder.id).await.is_none());
    }

    #[tokio::test]
    async fn cannot_delete_another_users_reminder() {
        let ctx = setup_context_inmemory();
        let owner_id = ID::default();
        let reminder = reminder_for(&owner_id);
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let usecase = DeleteReminderUseCase {
            user_id: ID::default(),
            reminder_id: reminder.id.clone(),
        };
        assert!(matches!(
            execute(usecase, &ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
        assert!(ctx.repos.reminders.find(&reminder.id).await.is_some());
    }

    #[tokio::test]
    async fn unknown_reminder_is_not_found() {
        let ctx = setup_context_inmemory();
        let usecase = DeleteReminderUseCase {
            user_id: ID::default(),
            reminder_id: ID::default(),
        };
        assert!(matches!(
            execute(usecase, &ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}

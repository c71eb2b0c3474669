use crate::error::HuddleError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use huddle_api_structs::get_reminders::APIResponse;
use huddle_domain::{Reminder, ID};
use huddle_infra::HuddleContext;

pub async fn get_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
) -> Result<HttpResponse, HuddleError> {
    let user = protect_route(&http_req, &ctx).await?;

    let usecase = GetRemindersUseCase { user_id: user.id };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(HuddleError::from)
}

/// Lists the pending (unsent) reminders of the authenticated user
#[derive(Debug)]
pub struct GetRemindersUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for HuddleError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait]
impl UseCase for GetRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminders";

    async fn execute(&mut self, ctx: &HuddleContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx.repos.reminders.find_pending_by_user(&self.user_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_domain::NotificationType;
    use huddle_infra::setup_context_inmemory;

    #[tokio::test]
    async fn lists_only_the_users_pending_reminders() {
        let ctx = setup_context_inmemory();
        let user_id = ID::default();
        let other_user_id = ID::default();

        let mine = Reminder::new(
            Default::default(),
            user_id.clone(),
            "Standup".into(),
            None,
            5_000,
            NotificationType::Push,
            0,
        );
        let theirs = Reminder::new(
            Default::default(),
            other_user_id,
            "Retro".into(),
            None,
            5_000,
            NotificationType::Push,
            0,
        );
        ctx.repos.reminders.insert(&mine).await.unwrap();
        ctx.repos.reminders.insert(&theirs).await.unwrap();

        let reminders = execute(GetRemindersUseCase { user_id }, &ctx)
            .await
            .expect("To list reminders");
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, mine.id);
    }
}

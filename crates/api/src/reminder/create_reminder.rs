use crate::error::HuddleError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use huddle_api_structs::create_reminder::{APIResponse, RequestBody};
use huddle_domain::{NotificationType, Reminder, ID};
use huddle_infra::HuddleContext;
use tracing::error;

pub async fn create_reminder_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, HuddleError> {
    let user = protect_route(&http_req, &ctx).await?;

    let body = body.into_inner();
    let usecase = CreateReminderUseCase {
        user_id: user.id,
        event_id: body.event_id,
        title: body.title,
        message: body.message,
        remind_at: body.remind_at,
        notification_type: body.notification_type,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Created().json(APIResponse::new(reminder)))
        .map_err(HuddleError::from)
}

/// Stores a new reminder for the authenticated user.
///
/// The stored reminder is not armed here, the owner's next
/// `load_and_schedule` picks it up. The client that created it arms it
/// through the schedule endpoint when it wants the timer live now.
#[derive(Debug)]
pub struct CreateReminderUseCase {
    pub user_id: ID,
    pub event_id: ID,
    pub title: String,
    pub message: Option<String>,
    pub remind_at: i64,
    pub notification_type: NotificationType,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyTitle,
    RemindAtInPast(i64),
    StorageError,
}

impl From<UseCaseError> for HuddleError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyTitle => {
                Self::BadClientData("The title of a reminder cannot be empty".into())
            }
            UseCaseError::RemindAtInPast(remind_at) => Self::BadClientData(format!(
                "The remind at timestamp: {} is already in the past",
                remind_at
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &HuddleContext) -> Result<Self::Response, Self::Error> {
        if self.title.trim().is_empty() {
            return Err(UseCaseError::EmptyTitle);
        }
        let now = ctx.sys.get_timestamp_millis();
        if self.remind_at <= now {
            return Err(UseCaseError::RemindAtInPast(self.remind_at));
        }

        let reminder = Reminder::new(
            self.event_id.clone(),
            self.user_id.clone(),
            self.title.clone(),
            self.message.clone(),
            self.remind_at,
            self.notification_type,
            now,
        );

        ctx.repos.reminders.insert(&reminder).await.map_err(|e| {
            error!(
                "Unable to store reminder for user: {}. Error: {:?}",
                self.user_id, e
            );
            UseCaseError::StorageError
        })?;

        Ok(reminder)
    }
}

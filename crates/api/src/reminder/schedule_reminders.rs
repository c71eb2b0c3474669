use crate::error::HuddleError;
use crate::reminder_scheduler::ReminderScheduler;
use crate::shared::auth::protect_route;
use actix_web::{web, HttpRequest, HttpResponse};
use huddle_api_structs::schedule_reminders::APIResponse;
use huddle_infra::HuddleContext;

/// Arms a timer for every pending reminder of the authenticated user.
/// Clients call this when a session starts. Safe to repeat, timers are
/// replaced rather than stacked.
pub async fn schedule_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
    scheduler: web::Data<ReminderScheduler>,
) -> Result<HttpResponse, HuddleError> {
    let user = protect_route(&http_req, &ctx).await?;

    let armed = scheduler.into_inner().load_and_schedule(&user.id).await;
    Ok(HttpResponse::Ok().json(APIResponse { armed }))
}

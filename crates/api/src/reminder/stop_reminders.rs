use crate::error::HuddleError;
use crate::reminder_scheduler::ReminderScheduler;
use crate::shared::auth::protect_route;
use actix_web::{web, HttpRequest, HttpResponse};
use huddle_api_structs::stop_reminders::APIResponse;
use huddle_infra::HuddleContext;

/// Disarms every timer of the authenticated user, the counterpart of
/// the schedule endpoint for session end
pub async fn stop_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<HuddleContext>,
    scheduler: web::Data<ReminderScheduler>,
) -> Result<HttpResponse, HuddleError> {
    let user = protect_route(&http_req, &ctx).await?;

    scheduler.cleanup(&user.id);
    Ok(HttpResponse::Ok().json(APIResponse { success: true }))
}

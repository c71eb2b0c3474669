mod create_reminder;
mod delete_reminder;
mod get_reminders;
mod schedule_reminders;
mod stop_reminders;

use actix_web::web;
use create_reminder::create_reminder_controller;
use delete_reminder::delete_reminder_controller;
use get_reminders::get_reminders_controller;
use schedule_reminders::schedule_reminders_controller;
use stop_reminders::stop_reminders_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/reminders", web::post().to(create_reminder_controller));
    cfg.route("/reminders", web::get().to(get_reminders_controller));
    // Register before the `{reminder_id}` routes so "schedule" is not
    // matched as a reminder id
    cfg.route(
        "/reminders/schedule",
        web::post().to(schedule_reminders_controller),
    );
    cfg.route(
        "/reminders/schedule",
        web::delete().to(stop_reminders_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}",
        web::delete().to(delete_reminder_controller),
    );
}

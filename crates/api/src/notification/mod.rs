pub mod send_notification;
mod subscribe;
mod unsubscribe;

use actix_web::web;
use huddle_domain::ID;
use send_notification::send_notification_controller;
use subscribe::subscribe_controller;
use unsubscribe::unsubscribe_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/notifications/send",
        web::post().to(send_notification_controller),
    );
    cfg.route(
        "/notifications/subscribe",
        web::post().to(subscribe_controller),
    );
    cfg.route(
        "/notifications/unsubscribe",
        web::post().to(unsubscribe_controller),
    );
}

/// Cache key for the memoized subscription lookups of one user
pub fn subscription_cache_key(user_id: &ID) -> String {
    format!("subscriptions:{}", user_id)
}

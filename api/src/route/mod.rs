use axum::Router;
use registry::AppRegistry;

pub mod booking;
pub mod health;
pub mod item;
pub mod item_request;
pub mod user;

pub fn routes() -> Router<AppRegistry> {
    Router::new()
        .merge(health::build_health_check_routers())
        .merge(user::build_user_routers())
        .merge(item::build_item_routers())
        .merge(booking::build_booking_routers())
        .merge(item_request::build_item_request_routers())
}

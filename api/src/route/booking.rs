use axum::{
    routing::{get, patch, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{
    decide_booking, register_booking, show_booking, show_booking_list, show_owner_booking_list,
};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let bookings_routers = Router::new()
        .route("/", post(register_booking))
        .route("/", get(show_booking_list))
        .route("/owner", get(show_owner_booking_list))
        .route("/:booking_id", get(show_booking))
        .route("/:booking_id", patch(decide_booking));

    Router::new().nest("/bookings", bookings_routers)
}

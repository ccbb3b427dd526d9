use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::availability_routes;
use booking_cell::booking_routes;
use reservation_cell::reservation_routes;
use shared_database::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/availability", availability_routes(state.clone()))
        .nest("/reservations", reservation_routes(state.clone()))
        .nest("/bookings", booking_routes(state))
}

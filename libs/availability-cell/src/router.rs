use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::AppState;

use crate::handlers;

pub fn availability_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/slots", get(handlers::get_available_slots))
        .route("/heatmap", get(handlers::get_availability_heatmap))
        .with_state(state)
}

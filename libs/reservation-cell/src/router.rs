use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

pub fn reservation_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/locks", post(handlers::acquire_lock))
        .route("/locks/release", post(handlers::release_locks))
        .with_state(state)
}

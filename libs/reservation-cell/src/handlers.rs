// libs/reservation-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{AcquireLockRequest, LockAcquired, LocksReleased, ReleaseLocksRequest};
use crate::services::ReservationLockService;

#[axum::debug_handler]
pub async fn acquire_lock(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AcquireLockRequest>,
) -> Result<(StatusCode, Json<LockAcquired>), AppError> {
    let lock_service = ReservationLockService::new(&state);

    let acquired = lock_service.acquire_lock(request).await?;

    Ok((StatusCode::CREATED, Json(acquired)))
}

#[axum::debug_handler]
pub async fn release_locks(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReleaseLocksRequest>,
) -> Result<Json<LocksReleased>, AppError> {
    let lock_service = ReservationLockService::new(&state);

    let released = lock_service.release_session_locks(&request.session_token).await?;

    Ok(Json(LocksReleased {
        success: true,
        released,
    }))
}

// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::Booking;

use crate::models::CreateBookingRequest;
use crate::services::BookingCommitService;

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking_service = BookingCommitService::new(&state);

    let booking = booking_service.create_booking(request).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

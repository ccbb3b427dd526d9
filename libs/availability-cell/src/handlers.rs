// libs/availability-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::error::AppError;

use crate::services::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub service_id: Uuid,
    pub location_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub service_id: Uuid,
    pub location_id: Uuid,
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let slots = availability_service
        .slots_for_day(query.date, query.service_id, query.location_id)
        .await?;

    Ok(Json(json!({
        "date": query.date,
        "service_id": query.service_id,
        "location_id": query.location_id,
        "total_slots": slots.len(),
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn get_availability_heatmap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let days = availability_service
        .heatmap(query.from, query.to, query.service_id, query.location_id)
        .await?;

    Ok(Json(json!({
        "from": query.from,
        "to": query.to,
        "service_id": query.service_id,
        "location_id": query.location_id,
        "days": days
    })))
}

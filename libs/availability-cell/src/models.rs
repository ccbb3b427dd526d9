use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_config::SchedulingConfig;
use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{BlackoutPeriod, Booking, Lock, ServiceRules, Shift};

/// A bookable candidate interval. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub shift_id: Uuid,
    pub staff_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Spacing of candidate starts and the zone whose midnight bounds a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub step: Duration,
    pub zone: FixedOffset,
}

impl SlotGrid {
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            step: config.slot_step(),
            zone: config.reference_zone(),
        }
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

/// Everything the generator reads for one day, service and location.
#[derive(Debug, Clone, Copy)]
pub struct SlotGenerationInput<'a> {
    pub date: NaiveDate,
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub shifts: &'a [Shift],
    pub rules: &'a ServiceRules,
    pub blackouts: &'a [BlackoutPeriod],
    pub existing_bookings: &'a [Booking],
    pub locks: &'a [Lock],
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub available_slots: usize,
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Service not found: {0}")]
    ServiceNotFound(Uuid),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AvailabilityError {
    pub fn code(&self) -> &'static str {
        match self {
            AvailabilityError::ServiceNotFound(_) => "NOT_FOUND",
            AvailabilityError::InvalidRange(_) => "INVALID_DATE_RANGE",
            AvailabilityError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        let code = err.code();
        match err {
            AvailabilityError::ServiceNotFound(_) => AppError::NotFound {
                code,
                message: err.to_string(),
            },
            AvailabilityError::InvalidRange(_) => AppError::ValidationError {
                code,
                message: err.to_string(),
            },
            AvailabilityError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

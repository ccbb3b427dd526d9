use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::TimeInterval;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireLockRequest {
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub staff_id: Uuid,
    pub shift_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub session_token: String,
}

impl AcquireLockRequest {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }
}

/// Returned to the client so it can render a checkout countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockAcquired {
    pub lock_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseLocksRequest {
    pub session_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocksReleased {
    pub success: bool,
    pub released: u64,
}

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Start time must be before end time")]
    InvalidTimeRange,

    #[error("Session token is required")]
    MissingSessionToken,

    #[error("Shift not found: {0}")]
    ShiftNotFound(Uuid),

    #[error("Slot is already booked")]
    SlotBooked,

    #[error("Slot is being reserved by another client")]
    SlotLocked,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LockError {
    pub fn code(&self) -> &'static str {
        match self {
            LockError::InvalidTimeRange => "INVALID_TIME_RANGE",
            LockError::MissingSessionToken => "VALIDATION_ERROR",
            LockError::ShiftNotFound(_) => "NOT_FOUND",
            LockError::SlotBooked => "SLOT_BOOKED",
            LockError::SlotLocked => "SLOT_LOCKED",
            LockError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        let code = err.code();
        match err {
            LockError::InvalidTimeRange | LockError::MissingSessionToken => AppError::ValidationError {
                code,
                message: err.to_string(),
            },
            LockError::ShiftNotFound(_) => AppError::NotFound {
                code,
                message: err.to_string(),
            },
            LockError::SlotBooked | LockError::SlotLocked => AppError::Conflict {
                code,
                message: err.to_string(),
            },
            LockError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

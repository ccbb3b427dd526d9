use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::PolicyAnswer;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub staff_id: Uuid,
    pub shift_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub policy_answers: Vec<PolicyAnswer>,
    #[serde(default)]
    pub add_ons: Vec<AddOnSelection>,
    /// Checkout session whose locks are released once the booking is stored.
    #[serde(default)]
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnSelection {
    pub add_on_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Unit price the client was shown; must match the catalog when present.
    #[serde(default)]
    pub price_eur_cents: Option<i64>,
}

fn default_quantity() -> i32 {
    1
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid booking request: {0}")]
    Validation(String),

    #[error("Shift not found: {0}")]
    ShiftNotFound(Uuid),

    #[error("Shift {0} is not active")]
    ShiftInactive(Uuid),

    #[error("Shift does not belong to the requested location and staff member")]
    ShiftMismatch,

    #[error("Service not found: {0}")]
    ServiceNotFound(Uuid),

    #[error("Service is not offered on this shift")]
    ServiceNotAvailable,

    #[error("Start time must be before end time")]
    InvalidTimeRange,

    #[error("Requested time is outside the shift's hours")]
    OutsideShiftHours,

    #[error("Booking must start at or after {earliest}")]
    LeadTime { earliest: DateTime<Utc> },

    #[error("Slot has already been taken")]
    SlotTaken,

    #[error("Invalid add-on: {0}")]
    InvalidAddOn(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl BookingError {
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::Validation(_) => "VALIDATION_ERROR",
            BookingError::ShiftNotFound(_) | BookingError::ServiceNotFound(_) => "NOT_FOUND",
            BookingError::ShiftInactive(_) => "INACTIVE",
            BookingError::ShiftMismatch => "MISMATCH",
            BookingError::ServiceNotAvailable => "SERVICE_NOT_AVAILABLE",
            BookingError::InvalidTimeRange => "INVALID_TIME_RANGE",
            BookingError::OutsideShiftHours => "OUTSIDE_HOURS",
            BookingError::LeadTime { .. } => "LEAD_TIME",
            BookingError::SlotTaken => "SLOT_TAKEN",
            BookingError::InvalidAddOn(_) => "INVALID_ADDON",
            BookingError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let code = err.code();
        match err {
            BookingError::Validation(_) | BookingError::InvalidTimeRange => AppError::ValidationError {
                code,
                message: err.to_string(),
            },
            BookingError::ShiftNotFound(_) | BookingError::ServiceNotFound(_) => AppError::NotFound {
                code,
                message: err.to_string(),
            },
            BookingError::SlotTaken => AppError::Conflict {
                code,
                message: err.to_string(),
            },
            BookingError::ShiftInactive(_)
            | BookingError::ShiftMismatch
            | BookingError::ServiceNotAvailable
            | BookingError::OutsideShiftHours
            | BookingError::LeadTime { .. }
            | BookingError::InvalidAddOn(_) => AppError::Unprocessable {
                code,
                message: err.to_string(),
            },
            BookingError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_statuses() {
        let cases = [
            (BookingError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (BookingError::ShiftNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (BookingError::ShiftMismatch, StatusCode::UNPROCESSABLE_ENTITY),
            (BookingError::OutsideShiftHours, StatusCode::UNPROCESSABLE_ENTITY),
            (BookingError::SlotTaken, StatusCode::CONFLICT),
            (BookingError::InvalidAddOn("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                BookingError::Storage(StoreError::Conflict("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let code = err.code();
            let app_error = AppError::from(err);
            assert_eq!(app_error.status(), status, "{}", code);
            assert_eq!(app_error.code(), code);
        }
    }

    #[test]
    fn test_add_on_selection_defaults() {
        let selection: AddOnSelection =
            serde_json::from_str(r#"{"add_on_id":"00000000-0000-0000-0000-000000000000"}"#).unwrap();

        assert_eq!(selection.quantity, 1);
        assert_eq!(selection.price_eur_cents, None);
    }
}

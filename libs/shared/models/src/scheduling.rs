use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interval::TimeInterval;

// ==============================================================================
// SCHEDULE INPUTS
// ==============================================================================

/// A staff member's working block at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub location_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub qualified_service_ids: Vec<Uuid>,
    pub is_active: bool,
}

impl Shift {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }

    pub fn is_qualified_for(&self, service_id: Uuid) -> bool {
        self.qualified_service_ids.contains(&service_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub buffer_minutes: i64,
    #[serde(default)]
    pub lead_time_minutes: i64,
    pub price_eur_cents: i64,
    pub is_active: bool,
}

impl Service {
    pub fn rules(&self) -> ServiceRules {
        ServiceRules {
            duration_minutes: self.duration_minutes,
            buffer_minutes: self.buffer_minutes,
            lead_time_minutes: self.lead_time_minutes,
        }
    }
}

/// Timing policy of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRules {
    pub duration_minutes: i64,
    /// Not applied to slot spacing.
    pub buffer_minutes: i64,
    pub lead_time_minutes: i64,
}

/// Closed date range `[start_date, end_date]` without availability at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    pub id: Uuid,
    pub location_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl BlackoutPeriod {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// ==============================================================================
// RESERVATION HOLDS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lock {
    pub id: Uuid,
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub staff_id: Uuid,
    pub shift_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Lock {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }

    /// Expired locks are inert; every read path goes through this.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLock {
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub staff_id: Uuid,
    pub shift_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

impl NewLock {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }
}

// ==============================================================================
// BOOKINGS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Only cancelled bookings release their interval.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let value = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAnswer {
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub staff_id: Uuid,
    pub shift_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_eur_cents: i64,
    pub status: BookingStatus,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub policy_answers: Vec<PolicyAnswer>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }
}

/// Insert payload for a booking; the store assigns `id` and stamps `created_at` with the commit instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub staff_id: Uuid,
    pub shift_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_eur_cents: i64,
    pub status: BookingStatus,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub policy_answers: Vec<PolicyAnswer>,
}

impl NewBooking {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }
}

// ==============================================================================
// ADD-ONS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub price_eur_cents: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingAddOn {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub add_on_id: Uuid,
    pub quantity: i32,
    pub unit_price_eur_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBookingAddOn {
    pub add_on_id: Uuid,
    pub quantity: i32,
    pub unit_price_eur_cents: i64,
}

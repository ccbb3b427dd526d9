use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_models::{
    AddOn, BlackoutPeriod, Booking, Lock, NewBooking, NewBookingAddOn, NewLock, Service, Shift,
    TimeInterval,
};

#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness or exclusion rule rejected the write.
    #[error("Write conflicts with an existing record: {0}")]
    Conflict(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode storage response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Storage API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// `[start - tolerance, start + tolerance]`, saturating at the calendar limits.
pub(crate) fn tolerance_window(start_time: DateTime<Utc>, tolerance: Duration) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        start_time.checked_sub_signed(tolerance).unwrap_or(DateTime::<Utc>::MIN_UTC),
        start_time.checked_add_signed(tolerance).unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
}

/// Durable records read and written by the scheduling engine.
///
/// Reads are free to run concurrently. The only mutual exclusion the engine relies
/// on is `commit_booking` refusing an interval that overlaps a non-cancelled booking
/// on the same shift, reported as [`StoreError::Conflict`].
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn get_shift(&self, shift_id: Uuid) -> StoreResult<Option<Shift>>;

    /// Shifts at a location whose interval overlaps `window`.
    async fn list_shifts(&self, location_id: Uuid, window: TimeInterval) -> StoreResult<Vec<Shift>>;

    async fn get_service(&self, service_id: Uuid) -> StoreResult<Option<Service>>;

    /// Join-table lookup: may `shift_id` fulfil `service_id`.
    async fn is_service_qualified(&self, shift_id: Uuid, service_id: Uuid) -> StoreResult<bool>;

    /// Blackouts at a location intersecting `[from, to]`.
    async fn list_blackouts(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<BlackoutPeriod>>;

    /// Non-cancelled bookings on the given shifts overlapping `window`.
    async fn list_bookings(&self, shift_ids: &[Uuid], window: TimeInterval) -> StoreResult<Vec<Booking>>;

    /// Locks on the given shifts overlapping `window` that are still active at `now`.
    async fn list_active_locks(
        &self,
        shift_ids: &[Uuid],
        window: TimeInterval,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Lock>>;

    /// Stores may reject an overlapping active lock of another session with
    /// [`StoreError::Conflict`]; they are not required to.
    async fn insert_lock(&self, lock: NewLock, now: DateTime<Utc>) -> StoreResult<Lock>;

    /// Removes the session's locks starting within `tolerance` of `start_time`.
    /// The window is clamped to the representable calendar.
    async fn delete_session_locks_near(
        &self,
        session_token: &str,
        start_time: DateTime<Utc>,
        tolerance: Duration,
    ) -> StoreResult<u64>;

    async fn delete_session_locks(&self, session_token: &str) -> StoreResult<u64>;

    /// Active add-ons offered with a service.
    async fn list_add_ons(&self, service_id: Uuid) -> StoreResult<Vec<AddOn>>;

    /// Persists the booking and its add-ons atomically, stamped `now`.
    async fn commit_booking(
        &self,
        booking: NewBooking,
        add_ons: Vec<NewBookingAddOn>,
        now: DateTime<Utc>,
    ) -> StoreResult<Booking>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tolerance_window_is_symmetric() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        let (lower, upper) = tolerance_window(start, Duration::seconds(60));

        assert_eq!(lower, Utc.with_ymd_and_hms(2025, 3, 10, 8, 59, 0).unwrap());
        assert_eq!(upper, Utc.with_ymd_and_hms(2025, 3, 10, 9, 1, 0).unwrap());
    }

    #[test]
    fn test_tolerance_window_saturates() {
        let (lower, upper) = tolerance_window(DateTime::<Utc>::MAX_UTC, Duration::seconds(60));
        assert_eq!(upper, DateTime::<Utc>::MAX_UTC);
        assert!(lower < upper);

        let (lower, _) = tolerance_window(DateTime::<Utc>::MIN_UTC, Duration::MAX);
        assert_eq!(lower, DateTime::<Utc>::MIN_UTC);
    }
}

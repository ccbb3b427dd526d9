// libs/reservation-cell/src/services/lock.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use shared_database::{AppState, SchedulingStore, StoreError};
use shared_models::NewLock;
use shared_utils::time::Clock;

use crate::models::{AcquireLockRequest, LockAcquired, LockError};

/// Session-scoped soft holds on slots during checkout.
///
/// Holds are advisory. The booking commit is the final arbiter, so the
/// check-then-insert window below is tolerated: two sessions racing past the
/// pre-checks can both end up holding overlapping locks unless the store
/// rejects the second insert itself.
pub struct ReservationLockService {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    refresh_tolerance: Duration,
}

impl ReservationLockService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            clock: Arc::clone(&state.clock),
            ttl: state.config.scheduling.lock_ttl(),
            refresh_tolerance: state.config.scheduling.lock_refresh_tolerance(),
        }
    }

    pub async fn acquire_lock(&self, request: AcquireLockRequest) -> Result<LockAcquired, LockError> {
        if request.session_token.trim().is_empty() {
            return Err(LockError::MissingSessionToken);
        }
        if request.start_time >= request.end_time {
            return Err(LockError::InvalidTimeRange);
        }

        let requested = request.interval();
        let now = self.clock.now();

        debug!(
            "Acquiring lock on shift {} from {} to {}",
            request.shift_id, request.start_time, request.end_time
        );

        // Step 1: the shift must exist before anything is held on it
        if self.store.get_shift(request.shift_id).await?.is_none() {
            info!("Lock refused: shift {} not found", request.shift_id);
            return Err(LockError::ShiftNotFound(request.shift_id));
        }

        // Step 2: a committed booking wins outright
        let bookings = self.store.list_bookings(&[request.shift_id], requested).await?;
        if bookings
            .iter()
            .any(|b| b.status.holds_slot() && b.interval().overlaps(&requested))
        {
            info!("Lock refused on shift {}: slot already booked", request.shift_id);
            return Err(LockError::SlotBooked);
        }

        // Step 3: another session is mid-checkout on an overlapping slot
        let locks = self
            .store
            .list_active_locks(&[request.shift_id], requested, now)
            .await?;
        if locks.iter().any(|l| {
            l.session_token != request.session_token
                && l.is_active_at(now)
                && l.interval().overlaps(&requested)
        }) {
            info!("Lock refused on shift {}: held by another session", request.shift_id);
            return Err(LockError::SlotLocked);
        }

        // Step 4: refresh, never stack, this session's hold on the same start
        let replaced = self
            .store
            .delete_session_locks_near(&request.session_token, request.start_time, self.refresh_tolerance)
            .await?;
        if replaced > 0 {
            debug!("Replaced {} previous lock(s) for the session", replaced);
        }

        let new_lock = NewLock {
            service_id: request.service_id,
            location_id: request.location_id,
            staff_id: request.staff_id,
            shift_id: request.shift_id,
            start_time: request.start_time,
            end_time: request.end_time,
            session_token: request.session_token,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let lock = self.store.insert_lock(new_lock, now).await.map_err(|e| match e {
            StoreError::Conflict(reason) => {
                warn!("Lock insert lost a race on shift {}: {}", request.shift_id, reason);
                LockError::SlotLocked
            }
            other => LockError::Storage(other),
        })?;

        info!("Lock {} acquired on shift {} until {}", lock.id, lock.shift_id, lock.expires_at);

        Ok(LockAcquired {
            lock_id: lock.id,
            expires_at: lock.expires_at,
        })
    }

    /// Drops every lock of the session. Releasing nothing is not an error.
    pub async fn release_session_locks(&self, session_token: &str) -> Result<u64, LockError> {
        if session_token.trim().is_empty() {
            return Err(LockError::MissingSessionToken);
        }

        let released = self.store.delete_session_locks(session_token).await?;
        debug!("Released {} lock(s) for session", released);

        Ok(released)
    }
}

// libs/shared/database/src/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{
    AddOn, BlackoutPeriod, Booking, BookingAddOn, Lock, NewBooking, NewBookingAddOn, NewLock,
    Service, Shift, TimeInterval,
};

use crate::store::{tolerance_window, SchedulingStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    shifts: HashMap<Uuid, Shift>,
    services: HashMap<Uuid, Service>,
    blackouts: Vec<BlackoutPeriod>,
    add_ons: Vec<AddOn>,
    bookings: Vec<Booking>,
    booking_add_ons: Vec<BookingAddOn>,
    locks: Vec<Lock>,
}

/// Process-local [`SchedulingStore`].
///
/// Every write runs under one write guard, so both the booking overlap check and
/// the lock overlap check are atomic with their insert.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_shift(&self, shift: Shift) {
        self.state.write().await.shifts.insert(shift.id, shift);
    }

    pub async fn insert_service(&self, service: Service) {
        self.state.write().await.services.insert(service.id, service);
    }

    pub async fn insert_blackout(&self, blackout: BlackoutPeriod) {
        self.state.write().await.blackouts.push(blackout);
    }

    pub async fn insert_add_on(&self, add_on: AddOn) {
        self.state.write().await.add_ons.push(add_on);
    }

    /// Seeds a booking without the overlap check, e.g. historical data.
    pub async fn seed_booking(&self, booking: Booking) {
        self.state.write().await.bookings.push(booking);
    }

    pub async fn seed_lock(&self, lock: Lock) {
        self.state.write().await.locks.push(lock);
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.state.read().await.bookings.clone()
    }

    pub async fn booking_add_ons(&self) -> Vec<BookingAddOn> {
        self.state.read().await.booking_add_ons.clone()
    }

    pub async fn locks(&self) -> Vec<Lock> {
        self.state.read().await.locks.clone()
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn get_shift(&self, shift_id: Uuid) -> StoreResult<Option<Shift>> {
        Ok(self.state.read().await.shifts.get(&shift_id).cloned())
    }

    async fn list_shifts(&self, location_id: Uuid, window: TimeInterval) -> StoreResult<Vec<Shift>> {
        let state = self.state.read().await;
        let mut shifts: Vec<Shift> = state
            .shifts
            .values()
            .filter(|shift| shift.location_id == location_id && shift.interval().overlaps(&window))
            .cloned()
            .collect();
        shifts.sort_by_key(|shift| shift.start_time);
        Ok(shifts)
    }

    async fn get_service(&self, service_id: Uuid) -> StoreResult<Option<Service>> {
        Ok(self.state.read().await.services.get(&service_id).cloned())
    }

    async fn is_service_qualified(&self, shift_id: Uuid, service_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .shifts
            .get(&shift_id)
            .map(|shift| shift.is_qualified_for(service_id))
            .unwrap_or(false))
    }

    async fn list_blackouts(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<BlackoutPeriod>> {
        Ok(self
            .state
            .read()
            .await
            .blackouts
            .iter()
            .filter(|b| b.location_id == location_id && b.start_date <= to && b.end_date >= from)
            .cloned()
            .collect())
    }

    async fn list_bookings(&self, shift_ids: &[Uuid], window: TimeInterval) -> StoreResult<Vec<Booking>> {
        Ok(self
            .state
            .read()
            .await
            .bookings
            .iter()
            .filter(|b| {
                shift_ids.contains(&b.shift_id) && b.status.holds_slot() && b.interval().overlaps(&window)
            })
            .cloned()
            .collect())
    }

    async fn list_active_locks(
        &self,
        shift_ids: &[Uuid],
        window: TimeInterval,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Lock>> {
        Ok(self
            .state
            .read()
            .await
            .locks
            .iter()
            .filter(|l| {
                shift_ids.contains(&l.shift_id) && l.is_active_at(now) && l.interval().overlaps(&window)
            })
            .cloned()
            .collect())
    }

    async fn insert_lock(&self, lock: NewLock, now: DateTime<Utc>) -> StoreResult<Lock> {
        let mut state = self.state.write().await;

        let requested = lock.interval();
        let contested = state.locks.iter().any(|existing| {
            existing.shift_id == lock.shift_id
                && existing.session_token != lock.session_token
                && existing.is_active_at(now)
                && existing.interval().overlaps(&requested)
        });
        if contested {
            return Err(StoreError::Conflict(format!(
                "shift {} already has an active lock overlapping {}",
                lock.shift_id, lock.start_time
            )));
        }

        let created = Lock {
            id: Uuid::new_v4(),
            service_id: lock.service_id,
            location_id: lock.location_id,
            staff_id: lock.staff_id,
            shift_id: lock.shift_id,
            start_time: lock.start_time,
            end_time: lock.end_time,
            session_token: lock.session_token,
            expires_at: lock.expires_at,
            created_at: now,
        };
        state.locks.push(created.clone());
        Ok(created)
    }

    async fn delete_session_locks_near(
        &self,
        session_token: &str,
        start_time: DateTime<Utc>,
        tolerance: Duration,
    ) -> StoreResult<u64> {
        let (lower, upper) = tolerance_window(start_time, tolerance);

        let mut state = self.state.write().await;
        let before = state.locks.len();
        state.locks.retain(|l| {
            !(l.session_token == session_token && l.start_time >= lower && l.start_time <= upper)
        });
        Ok((before - state.locks.len()) as u64)
    }

    async fn delete_session_locks(&self, session_token: &str) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let before = state.locks.len();
        state.locks.retain(|l| l.session_token != session_token);
        Ok((before - state.locks.len()) as u64)
    }

    async fn list_add_ons(&self, service_id: Uuid) -> StoreResult<Vec<AddOn>> {
        Ok(self
            .state
            .read()
            .await
            .add_ons
            .iter()
            .filter(|a| a.service_id == service_id && a.is_active)
            .cloned()
            .collect())
    }

    async fn commit_booking(
        &self,
        booking: NewBooking,
        add_ons: Vec<NewBookingAddOn>,
        now: DateTime<Utc>,
    ) -> StoreResult<Booking> {
        let mut state = self.state.write().await;

        let requested = booking.interval();
        if let Some(existing) = state.bookings.iter().find(|b| {
            b.shift_id == booking.shift_id && b.status.holds_slot() && b.interval().overlaps(&requested)
        }) {
            return Err(StoreError::Conflict(format!(
                "booking overlaps existing booking {}",
                existing.id
            )));
        }

        let created = Booking {
            id: Uuid::new_v4(),
            service_id: booking.service_id,
            location_id: booking.location_id,
            staff_id: booking.staff_id,
            shift_id: booking.shift_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            price_eur_cents: booking.price_eur_cents,
            status: booking.status,
            client_name: booking.client_name,
            client_email: booking.client_email,
            client_phone: booking.client_phone,
            notes: booking.notes,
            policy_answers: booking.policy_answers,
            created_at: now,
        };

        state.booking_add_ons.extend(add_ons.into_iter().map(|add_on| BookingAddOn {
            id: Uuid::new_v4(),
            booking_id: created.id,
            add_on_id: add_on.add_on_id,
            quantity: add_on.quantity,
            unit_price_eur_cents: add_on.unit_price_eur_cents,
        }));
        state.bookings.push(created.clone());

        debug!("Stored booking {} on shift {}", created.id, created.shift_id);
        Ok(created)
    }
}

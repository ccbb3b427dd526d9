// libs/availability-cell/src/services/availability.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{AppState, SchedulingStore};
use shared_models::{BlackoutPeriod, Booking, Lock, ServiceRules, Shift};
use shared_utils::time::{days_interval, Clock};

use crate::models::{AvailabilityError, DayAvailability, Slot, SlotGenerationInput, SlotGrid};
use crate::services::heatmap::summarize_day_heatmap;
use crate::services::slots::generate_slots_for_day;

/// Schedule data for a date range, loaded once and sliced per day. `now` is the
/// instant locks were filtered at and is reused for every day.
struct ScheduleSnapshot {
    now: DateTime<Utc>,
    rules: ServiceRules,
    shifts: Vec<Shift>,
    blackouts: Vec<BlackoutPeriod>,
    bookings: Vec<Booking>,
    locks: Vec<Lock>,
}

pub struct AvailabilityService {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    grid: SlotGrid,
    max_heatmap_days: i64,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            clock: Arc::clone(&state.clock),
            grid: SlotGrid::from_config(&state.config.scheduling),
            max_heatmap_days: state.config.scheduling.max_heatmap_days,
        }
    }

    /// Bookable slots for one day, ascending by start.
    pub async fn slots_for_day(
        &self,
        date: NaiveDate,
        service_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        debug!("Calculating slots for service {} at location {} on {}", service_id, location_id, date);

        let snapshot = self.load_snapshot(date, date, service_id, location_id).await?;
        let slots = self.generate(&snapshot, date, service_id, location_id);

        debug!("Found {} available slots", slots.len());
        Ok(slots)
    }

    /// Per-day slot counts for every date in `[from, to]`.
    pub async fn heatmap(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        service_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<DayAvailability>, AvailabilityError> {
        if from > to {
            return Err(AvailabilityError::InvalidRange(format!("{} is after {}", from, to)));
        }

        let days = (to - from).num_days() + 1;
        if days > self.max_heatmap_days {
            return Err(AvailabilityError::InvalidRange(format!(
                "{} days requested, at most {} allowed",
                days, self.max_heatmap_days
            )));
        }

        let snapshot = self.load_snapshot(from, to, service_id, location_id).await?;

        let dates: Vec<NaiveDate> = from.iter_days().take(days as usize).collect();
        let per_day: HashMap<String, usize> = dates
            .iter()
            .map(|date| {
                let count = self.generate(&snapshot, *date, service_id, location_id).len();
                (date.format("%Y-%m-%d").to_string(), count)
            })
            .collect();

        info!(
            "Computed availability heatmap for service {} at location {} ({} days)",
            service_id, location_id, days
        );
        Ok(summarize_day_heatmap(&dates, &per_day))
    }

    fn generate(
        &self,
        snapshot: &ScheduleSnapshot,
        date: NaiveDate,
        service_id: Uuid,
        location_id: Uuid,
    ) -> Vec<Slot> {
        let input = SlotGenerationInput {
            date,
            service_id,
            location_id,
            shifts: &snapshot.shifts,
            rules: &snapshot.rules,
            blackouts: &snapshot.blackouts,
            existing_bookings: &snapshot.bookings,
            locks: &snapshot.locks,
            now: snapshot.now,
        };

        generate_slots_for_day(&input, &self.grid)
    }

    async fn load_snapshot(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        service_id: Uuid,
        location_id: Uuid,
    ) -> Result<ScheduleSnapshot, AvailabilityError> {
        let service = self
            .store
            .get_service(service_id)
            .await?
            .ok_or(AvailabilityError::ServiceNotFound(service_id))?;

        let window = days_interval(from, to, &self.grid.zone).ok_or_else(|| {
            AvailabilityError::InvalidRange(format!("{} to {} is outside the supported calendar", from, to))
        })?;
        let now = self.clock.now();

        let blackouts = self.store.list_blackouts(location_id, from, to).await?;
        let shifts = self.store.list_shifts(location_id, window).await?;

        let shift_ids: Vec<Uuid> = shifts.iter().map(|s| s.id).collect();
        let bookings = self.store.list_bookings(&shift_ids, window).await?;
        let locks = self
            .store
            .list_active_locks(&shift_ids, window, now)
            .await?;

        Ok(ScheduleSnapshot {
            now,
            rules: service.rules(),
            shifts,
            blackouts,
            bookings,
            locks,
        })
    }
}

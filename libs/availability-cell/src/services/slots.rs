// libs/availability-cell/src/services/slots.rs
use chrono::Duration;
use tracing::debug;

use shared_models::{Booking, Lock, Shift, TimeInterval};
use shared_utils::time::{add_minutes, day_interval, intervals_overlap};

use crate::models::{Slot, SlotGenerationInput, SlotGrid};

/// Computes the ordered bookable slots for one day.
///
/// Candidates of the service's duration are laid on a fixed grid starting at each
/// shift's day-clipped start, independent of the duration itself. A candidate is
/// dropped when it starts before `now + lead time` or overlaps a non-cancelled
/// booking or an active lock on the same shift. A blackout covering the date
/// empties the whole day. Malformed shifts contribute nothing.
pub fn generate_slots_for_day(input: &SlotGenerationInput<'_>, grid: &SlotGrid) -> Vec<Slot> {
    if let Some(blackout) = input
        .blackouts
        .iter()
        .find(|b| b.location_id == input.location_id && b.covers(input.date))
    {
        debug!(
            "Location {} blacked out on {} ({:?})",
            input.location_id, input.date, blackout.reason
        );
        return vec![];
    }

    let duration = match Duration::try_minutes(input.rules.duration_minutes) {
        Some(duration) if duration > Duration::zero() => duration,
        _ => return vec![],
    };
    if grid.step <= Duration::zero() {
        return vec![];
    }

    // Out-of-range lead times or dates leave nothing bookable.
    let (Some(min_start_allowed), Some(day)) = (
        add_minutes(input.now, input.rules.lead_time_minutes),
        day_interval(input.date, &grid.zone),
    ) else {
        debug!("Schedule arithmetic out of range for {}, no slots", input.date);
        return vec![];
    };

    let mut slots = Vec::new();

    for shift in input.shifts {
        if !offers_service(shift, input) {
            continue;
        }

        let window = shift.interval().clip_to(&day);
        if window.is_empty() {
            continue;
        }

        let booked = taken_intervals(input.existing_bookings, shift);
        let held = held_intervals(input.locks, shift, input);

        let mut cursor = window.start;
        while let Some(candidate_end) = cursor.checked_add_signed(duration) {
            if candidate_end > window.end {
                break;
            }
            let candidate = TimeInterval::new(cursor, candidate_end);

            let accepted = candidate.start >= min_start_allowed
                && !overlaps_any(&candidate, &booked)
                && !overlaps_any(&candidate, &held);

            if accepted {
                slots.push(Slot {
                    shift_id: shift.id,
                    staff_id: shift.staff_id,
                    start_time: candidate.start,
                    end_time: candidate.end,
                });
            }

            match cursor.checked_add_signed(grid.step) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    slots.sort_by_key(|slot| slot.start_time);
    slots
}

fn offers_service(shift: &Shift, input: &SlotGenerationInput<'_>) -> bool {
    shift.is_active
        && shift.location_id == input.location_id
        && shift.is_qualified_for(input.service_id)
}

fn taken_intervals(bookings: &[Booking], shift: &Shift) -> Vec<TimeInterval> {
    bookings
        .iter()
        .filter(|b| b.shift_id == shift.id && b.status.holds_slot())
        .map(Booking::interval)
        .collect()
}

fn held_intervals(locks: &[Lock], shift: &Shift, input: &SlotGenerationInput<'_>) -> Vec<TimeInterval> {
    locks
        .iter()
        .filter(|l| l.shift_id == shift.id && l.is_active_at(input.now))
        .map(Lock::interval)
        .collect()
}

fn overlaps_any(candidate: &TimeInterval, taken: &[TimeInterval]) -> bool {
    taken.iter().any(|t| intervals_overlap(candidate, t))
}

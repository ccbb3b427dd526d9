// libs/booking-cell/src/services/commit.rs
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use shared_database::{AppState, SchedulingStore, StoreError};
use shared_models::{Booking, BookingStatus, NewBooking, TimeInterval};
use shared_utils::time::{add_minutes, Clock};

use crate::models::{BookingError, CreateBookingRequest};
use crate::services::addons::{price_with_add_ons, resolve_add_ons};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const PHONE_PATTERN: &str = r"^\+?[0-9][0-9\s\-\.\(\)]{5,19}$";

pub struct BookingCommitService {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
}

impl BookingCommitService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            clock: Arc::clone(&state.clock),
        }
    }

    /// Re-validates the request against current schedule data and stores the
    /// booking with its add-ons in one write.
    ///
    /// Overlap with another booking is only decided by the store, which is what
    /// makes two concurrent commits for the same slot admit exactly one.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        info!(
            "Creating booking on shift {} from {} to {}",
            request.shift_id, request.start_time, request.end_time
        );

        // Step 1: contact details
        self.validate_contact(&request)?;

        // Step 2: shift exists, is active and belongs to the requested staff/location
        let shift = self
            .store
            .get_shift(request.shift_id)
            .await?
            .ok_or(BookingError::ShiftNotFound(request.shift_id))?;

        if !shift.is_active {
            return Err(BookingError::ShiftInactive(shift.id));
        }
        if shift.location_id != request.location_id || shift.staff_id != request.staff_id {
            return Err(BookingError::ShiftMismatch);
        }

        // Step 3: service exists and may be performed on this shift
        let service = self
            .store
            .get_service(request.service_id)
            .await?
            .ok_or(BookingError::ServiceNotFound(request.service_id))?;

        if !self.store.is_service_qualified(shift.id, service.id).await? {
            return Err(BookingError::ServiceNotAvailable);
        }

        // Step 4: time range inside the shift
        if request.start_time >= request.end_time {
            return Err(BookingError::InvalidTimeRange);
        }
        let requested = TimeInterval::new(request.start_time, request.end_time);
        if !shift.interval().contains(&requested) {
            return Err(BookingError::OutsideShiftHours);
        }

        // Step 5: lead time
        let now = self.clock.now();
        let earliest = add_minutes(now, service.lead_time_minutes).ok_or_else(|| {
            BookingError::Validation(format!(
                "lead time of {} minutes is out of range",
                service.lead_time_minutes
            ))
        })?;
        if request.start_time < earliest {
            return Err(BookingError::LeadTime { earliest });
        }

        // Step 6: add-ons, priced from the catalog
        let add_ons = if request.add_ons.is_empty() {
            Vec::new()
        } else {
            let catalog = self.store.list_add_ons(service.id).await?;
            resolve_add_ons(&request.add_ons, &catalog)?
        };
        let price_eur_cents = price_with_add_ons(service.price_eur_cents, &add_ons);

        debug!("Booking price {} cents with {} add-on line(s)", price_eur_cents, add_ons.len());

        // Step 7: atomic insert
        let new_booking = NewBooking {
            service_id: service.id,
            location_id: shift.location_id,
            staff_id: shift.staff_id,
            shift_id: shift.id,
            start_time: request.start_time,
            end_time: request.end_time,
            price_eur_cents,
            status: BookingStatus::Confirmed,
            client_name: request.client_name.trim().to_string(),
            client_email: request.client_email.trim().to_string(),
            client_phone: request.client_phone.clone(),
            notes: request.notes.clone(),
            policy_answers: request.policy_answers.clone(),
        };

        let booking = self
            .store
            .commit_booking(new_booking, add_ons, now)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(reason) => {
                    info!("Booking refused on shift {}: {}", shift.id, reason);
                    BookingError::SlotTaken
                }
                other => BookingError::Storage(other),
            })?;

        info!("Booking {} created on shift {}", booking.id, booking.shift_id);

        // Step 8: the checkout is over, drop its holds
        if let Some(token) = request.session_token.as_deref().filter(|t| !t.trim().is_empty()) {
            match self.store.delete_session_locks(token).await {
                Ok(released) => debug!("Released {} lock(s) after booking {}", released, booking.id),
                Err(e) => warn!("Failed to release session locks after booking {}: {}", booking.id, e),
            }
        }

        Ok(booking)
    }

    fn validate_contact(&self, request: &CreateBookingRequest) -> Result<(), BookingError> {
        if request.client_name.trim().is_empty() {
            return Err(BookingError::Validation("client_name is required".to_string()));
        }

        let email = request.client_email.trim();
        if email.len() > 254 || !matches_pattern(EMAIL_PATTERN, email) {
            return Err(BookingError::Validation(format!("invalid client_email: {}", email)));
        }

        if let Some(phone) = request.client_phone.as_deref() {
            if !matches_pattern(PHONE_PATTERN, phone.trim()) {
                return Err(BookingError::Validation("invalid client_phone".to_string()));
            }
        }

        Ok(())
    }
}

fn matches_pattern(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(value)).unwrap_or(false)
}

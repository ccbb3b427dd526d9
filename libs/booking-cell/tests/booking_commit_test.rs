// libs/booking-cell/tests/booking_commit_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use booking_cell::{booking_routes, AddOnSelection, BookingCommitService, BookingError, CreateBookingRequest};
use shared_database::{AppState, InMemoryStore, SchedulingStore};
use shared_models::{AddOn, BookingStatus, Shift};
use shared_utils::test_utils::{on_test_day, ClinicIds, TestConfig};
use shared_utils::FixedClock;

struct TestSetup {
    ids: ClinicIds,
    shift: Shift,
    store: Arc<InMemoryStore>,
    state: AppState,
}

impl TestSetup {
    /// 30 minute service priced at 45.00 EUR, one 08:00–12:00 shift, clock at 07:00.
    async fn new() -> Self {
        let ids = ClinicIds::default();
        let store = Arc::new(InMemoryStore::new());
        let shift = ids.shift(on_test_day(8, 0), on_test_day(12, 0));

        store.insert_service(ids.service(30, 0)).await;
        store.insert_shift(shift.clone()).await;

        let clock = Arc::new(FixedClock::new(on_test_day(7, 0)));
        let dyn_store: Arc<dyn SchedulingStore> = store.clone();
        let state = AppState::new(TestConfig::default().to_app_config(), dyn_store, clock);

        Self { ids, shift, store, state }
    }

    fn service(&self) -> BookingCommitService {
        BookingCommitService::new(&self.state)
    }

    fn request(&self, h: u32, m: u32) -> CreateBookingRequest {
        let start_time = on_test_day(h, m);
        CreateBookingRequest {
            service_id: self.ids.service_id,
            location_id: self.ids.location_id,
            staff_id: self.shift.staff_id,
            shift_id: self.shift.id,
            start_time,
            end_time: start_time + Duration::minutes(30),
            client_name: "Ana Costa".to_string(),
            client_email: "ana.costa@example.com".to_string(),
            client_phone: Some("+351 912 345 678".to_string()),
            notes: None,
            policy_answers: vec![],
            add_ons: vec![],
            session_token: None,
        }
    }

    async fn add_on(&self, name: &str, price_eur_cents: i64) -> AddOn {
        let add_on = self.ids.add_on(name, price_eur_cents);
        self.store.insert_add_on(add_on.clone()).await;
        add_on
    }
}

// ==============================================================================
// HAPPY PATH
// ==============================================================================

#[tokio::test]
async fn test_create_booking_stores_confirmed_booking() {
    let setup = TestSetup::new().await;

    let booking = setup.service().create_booking(setup.request(9, 0)).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.price_eur_cents, 4500);
    assert_eq!(booking.shift_id, setup.shift.id);
    assert_eq!(booking.start_time, on_test_day(9, 0));
    assert_eq!(booking.created_at, on_test_day(7, 0));
    assert_eq!(setup.store.bookings().await.len(), 1);
}

#[tokio::test]
async fn test_add_ons_are_priced_and_stored_with_booking() {
    let setup = TestSetup::new().await;
    let stones = setup.add_on("Hot stones", 1500).await;
    let oil = setup.add_on("Oil upgrade", 700).await;

    let mut request = setup.request(9, 0);
    request.add_ons = vec![
        AddOnSelection { add_on_id: stones.id, quantity: 1, price_eur_cents: Some(1500) },
        AddOnSelection { add_on_id: oil.id, quantity: 2, price_eur_cents: None },
    ];

    let booking = setup.service().create_booking(request).await.unwrap();

    assert_eq!(booking.price_eur_cents, 4500 + 1500 + 2 * 700);
    let lines = setup.store.booking_add_ons().await;
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.booking_id == booking.id));
}

#[tokio::test]
async fn test_invalid_add_on_rejects_whole_booking() {
    let setup = TestSetup::new().await;
    let stones = setup.add_on("Hot stones", 1500).await;

    let mut request = setup.request(9, 0);
    request.add_ons = vec![
        AddOnSelection { add_on_id: stones.id, quantity: 1, price_eur_cents: None },
        AddOnSelection { add_on_id: Uuid::new_v4(), quantity: 1, price_eur_cents: None },
    ];

    let result = setup.service().create_booking(request).await;

    assert_matches!(result, Err(BookingError::InvalidAddOn(_)));
    assert!(setup.store.bookings().await.is_empty());
    assert!(setup.store.booking_add_ons().await.is_empty());
}

#[tokio::test]
async fn test_add_on_of_other_service_is_rejected() {
    let setup = TestSetup::new().await;
    let foreign = ClinicIds::default().add_on("Foreign extra", 500);
    setup.store.insert_add_on(foreign.clone()).await;

    let mut request = setup.request(9, 0);
    request.add_ons = vec![AddOnSelection { add_on_id: foreign.id, quantity: 1, price_eur_cents: None }];

    assert_matches!(
        setup.service().create_booking(request).await,
        Err(BookingError::InvalidAddOn(_))
    );
}

#[tokio::test]
async fn test_session_locks_are_released_after_commit() {
    let setup = TestSetup::new().await;
    setup
        .store
        .seed_lock(setup.ids.lock(&setup.shift, on_test_day(9, 0), on_test_day(9, 30), "checkout-1", on_test_day(7, 30)))
        .await;
    setup
        .store
        .seed_lock(setup.ids.lock(&setup.shift, on_test_day(10, 0), on_test_day(10, 30), "checkout-2", on_test_day(7, 30)))
        .await;

    let mut request = setup.request(9, 0);
    request.session_token = Some("checkout-1".to_string());
    setup.service().create_booking(request).await.unwrap();

    let locks = setup.store.locks().await;
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].session_token, "checkout-2");
}

// ==============================================================================
// REJECTIONS
// ==============================================================================

#[tokio::test]
async fn test_unknown_shift_and_service_are_not_found() {
    let setup = TestSetup::new().await;
    let service = setup.service();

    let mut request = setup.request(9, 0);
    request.shift_id = Uuid::new_v4();
    assert_matches!(service.create_booking(request).await, Err(BookingError::ShiftNotFound(_)));

    let mut request = setup.request(9, 0);
    request.service_id = Uuid::new_v4();
    assert_matches!(service.create_booking(request).await, Err(BookingError::ServiceNotFound(_)));
}

#[tokio::test]
async fn test_inactive_shift_is_rejected() {
    let setup = TestSetup::new().await;
    let mut inactive = setup.ids.shift(on_test_day(13, 0), on_test_day(17, 0));
    inactive.is_active = false;
    setup.store.insert_shift(inactive.clone()).await;

    let mut request = setup.request(14, 0);
    request.shift_id = inactive.id;

    assert_matches!(
        setup.service().create_booking(request).await,
        Err(BookingError::ShiftInactive(id)) if id == inactive.id
    );
}

#[tokio::test]
async fn test_mismatched_location_or_staff_is_rejected() {
    let setup = TestSetup::new().await;
    let service = setup.service();

    let mut request = setup.request(9, 0);
    request.location_id = Uuid::new_v4();
    assert_matches!(service.create_booking(request).await, Err(BookingError::ShiftMismatch));

    let mut request = setup.request(9, 0);
    request.staff_id = Uuid::new_v4();
    assert_matches!(service.create_booking(request).await, Err(BookingError::ShiftMismatch));
}

#[tokio::test]
async fn test_unqualified_service_is_rejected() {
    let setup = TestSetup::new().await;
    let other = ClinicIds {
        service_id: Uuid::new_v4(),
        ..setup.ids
    };
    setup.store.insert_service(other.service(30, 0)).await;

    let mut request = setup.request(9, 0);
    request.service_id = other.service_id;

    assert_matches!(
        setup.service().create_booking(request).await,
        Err(BookingError::ServiceNotAvailable)
    );
}

#[tokio::test]
async fn test_time_range_must_be_valid_and_inside_shift() {
    let setup = TestSetup::new().await;
    let service = setup.service();

    let mut inverted = setup.request(9, 0);
    inverted.end_time = inverted.start_time - Duration::minutes(30);
    assert_matches!(service.create_booking(inverted).await, Err(BookingError::InvalidTimeRange));

    let overrun = setup.request(11, 45);
    assert_matches!(service.create_booking(overrun).await, Err(BookingError::OutsideShiftHours));

    let early = setup.request(7, 45);
    assert_matches!(service.create_booking(early).await, Err(BookingError::OutsideShiftHours));

    let last = setup.request(11, 30);
    assert!(service.create_booking(last).await.is_ok());
}

#[tokio::test]
async fn test_lead_time_is_enforced() {
    let setup = TestSetup::new().await;
    setup.store.insert_service(setup.ids.service(30, 120)).await;
    let service = setup.service();

    assert_matches!(
        service.create_booking(setup.request(8, 30)).await,
        Err(BookingError::LeadTime { earliest }) if earliest == on_test_day(9, 0)
    );
    assert!(service.create_booking(setup.request(9, 0)).await.is_ok());
}

#[tokio::test]
async fn test_unbounded_lead_time_is_a_validation_error() {
    let setup = TestSetup::new().await;
    setup.store.insert_service(setup.ids.service(30, i64::MAX)).await;

    let result = setup.service().create_booking(setup.request(9, 0)).await;

    assert_matches!(result, Err(BookingError::Validation(_)));
    assert!(setup.store.bookings().await.is_empty());
}

#[tokio::test]
async fn test_contact_details_are_validated() {
    let setup = TestSetup::new().await;
    let service = setup.service();

    let mut nameless = setup.request(9, 0);
    nameless.client_name = "   ".to_string();
    assert_matches!(service.create_booking(nameless).await, Err(BookingError::Validation(_)));

    let mut bad_email = setup.request(9, 0);
    bad_email.client_email = "ana.costa-at-example".to_string();
    assert_matches!(service.create_booking(bad_email).await, Err(BookingError::Validation(_)));

    let mut bad_phone = setup.request(9, 0);
    bad_phone.client_phone = Some("call me".to_string());
    assert_matches!(service.create_booking(bad_phone).await, Err(BookingError::Validation(_)));

    assert!(setup.store.bookings().await.is_empty());
}

// ==============================================================================
// DOUBLE BOOKING
// ==============================================================================

#[tokio::test]
async fn test_overlapping_booking_is_slot_taken() {
    let setup = TestSetup::new().await;
    let service = setup.service();

    service.create_booking(setup.request(9, 0)).await.unwrap();

    assert_matches!(service.create_booking(setup.request(9, 15)).await, Err(BookingError::SlotTaken));
    assert!(service.create_booking(setup.request(9, 30)).await.is_ok());
}

#[tokio::test]
async fn test_cancelled_booking_frees_the_slot() {
    let setup = TestSetup::new().await;
    let mut cancelled = setup.ids.booking(&setup.shift, on_test_day(9, 0), on_test_day(9, 30));
    cancelled.status = BookingStatus::Cancelled;
    setup.store.seed_booking(cancelled).await;

    assert!(setup.service().create_booking(setup.request(9, 0)).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_commits_for_same_slot_admit_exactly_one() {
    let setup = TestSetup::new().await;
    let service = Arc::new(setup.service());

    let attempts = (0..10).map(|i| {
        let service = Arc::clone(&service);
        let mut request = setup.request(9, 0);
        request.client_email = format!("client{}@example.com", i);
        async move { service.create_booking(request).await }
    });
    let results = futures::future::join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, BookingError::SlotTaken)));
    assert_eq!(setup.store.bookings().await.len(), 1);
}

#[tokio::test]
async fn test_concurrent_commits_on_spawned_tasks_admit_exactly_one() {
    let setup = TestSetup::new().await;
    let state = setup.state.clone();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let state = state.clone();
            let request = setup.request(10, 0);
            tokio::spawn(async move { BookingCommitService::new(&state).create_booking(request).await.is_ok() })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 1);
}

// ==============================================================================
// HTTP
// ==============================================================================

async fn post_booking(state: AppState, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = booking_routes(Arc::new(state)).oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_create_booking_endpoint() {
    let setup = TestSetup::new().await;
    let body = serde_json::to_value(setup.request(9, 0)).unwrap();

    let (status, json) = post_booking(setup.state.clone(), body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "confirmed");
    assert_eq!(json["price_eur_cents"], 4500);
    assert_eq!(json["start_time"], "2025-03-10T09:00:00Z");
}

#[tokio::test]
async fn test_create_booking_endpoint_error_statuses() {
    let setup = TestSetup::new().await;
    setup.service().create_booking(setup.request(9, 0)).await.unwrap();

    let taken = serde_json::to_value(setup.request(9, 0)).unwrap();
    let (status, json) = post_booking(setup.state.clone(), taken).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "SLOT_TAKEN");

    let outside = serde_json::to_value(setup.request(11, 45)).unwrap();
    let (status, json) = post_booking(setup.state.clone(), outside).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "OUTSIDE_HOURS");

    let mut invalid = setup.request(10, 0);
    invalid.client_email = String::new();
    let (status, json) = post_booking(setup.state.clone(), serde_json::to_value(invalid).unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// libs/shared/database/src/supabase_store.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{
    AddOn, BlackoutPeriod, Booking, Lock, NewBooking, NewBookingAddOn, NewLock, Service, Shift,
    TimeInterval,
};

use crate::store::{tolerance_window, SchedulingStore, StoreError, StoreResult};
use crate::supabase::SupabaseClient;

const SHIFT_SELECT: &str = "select=*,shift_services(service_id)";

/// Shift row with its embedded `shift_services` join rows.
#[derive(Debug, Deserialize)]
struct ShiftRow {
    id: Uuid,
    staff_id: Uuid,
    location_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    is_active: bool,
    #[serde(default)]
    shift_services: Vec<ShiftServiceRow>,
}

#[derive(Debug, Deserialize)]
struct ShiftServiceRow {
    service_id: Uuid,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Shift {
            id: row.id,
            staff_id: row.staff_id,
            location_id: row.location_id,
            start_time: row.start_time,
            end_time: row.end_time,
            qualified_service_ids: row.shift_services.into_iter().map(|s| s.service_id).collect(),
            is_active: row.is_active,
        }
    }
}

/// [`SchedulingStore`] backed by Supabase's PostgREST API.
///
/// Booking overlap is enforced by an exclusion constraint on `bookings`, and
/// `commit_booking` goes through the `commit_booking` RPC so the booking and its
/// add-ons share one transaction.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn first_or_none<T>(&self, path: &str) -> StoreResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let rows: Vec<T> = self.supabase.request(Method::GET, path, None).await?;
        Ok(rows.into_iter().next())
    }
}

fn ts(at: DateTime<Utc>) -> String {
    urlencoding::encode(&at.to_rfc3339()).into_owned()
}

fn id_list(ids: &[Uuid]) -> String {
    ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",")
}

#[async_trait]
impl SchedulingStore for SupabaseStore {
    async fn get_shift(&self, shift_id: Uuid) -> StoreResult<Option<Shift>> {
        let path = format!("/rest/v1/shifts?id=eq.{}&{}", shift_id, SHIFT_SELECT);
        let row: Option<ShiftRow> = self.first_or_none(&path).await?;
        Ok(row.map(Shift::from))
    }

    async fn list_shifts(&self, location_id: Uuid, window: TimeInterval) -> StoreResult<Vec<Shift>> {
        let path = format!(
            "/rest/v1/shifts?location_id=eq.{}&start_time=lt.{}&end_time=gt.{}&{}&order=start_time.asc",
            location_id,
            ts(window.end),
            ts(window.start),
            SHIFT_SELECT
        );

        let rows: Vec<ShiftRow> = self.supabase.request(Method::GET, &path, None).await?;
        debug!("Loaded {} shifts for location {}", rows.len(), location_id);

        Ok(rows.into_iter().map(Shift::from).collect())
    }

    async fn get_service(&self, service_id: Uuid) -> StoreResult<Option<Service>> {
        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        self.first_or_none(&path).await
    }

    async fn is_service_qualified(&self, shift_id: Uuid, service_id: Uuid) -> StoreResult<bool> {
        let path = format!(
            "/rest/v1/shift_services?shift_id=eq.{}&service_id=eq.{}&select=shift_id",
            shift_id, service_id
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(!rows.is_empty())
    }

    async fn list_blackouts(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<BlackoutPeriod>> {
        let path = format!(
            "/rest/v1/blackout_periods?location_id=eq.{}&start_date=lte.{}&end_date=gte.{}",
            location_id, to, from
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn list_bookings(&self, shift_ids: &[Uuid], window: TimeInterval) -> StoreResult<Vec<Booking>> {
        if shift_ids.is_empty() {
            return Ok(vec![]);
        }

        let path = format!(
            "/rest/v1/bookings?shift_id=in.({})&status=neq.cancelled&start_time=lt.{}&end_time=gt.{}&order=start_time.asc",
            id_list(shift_ids),
            ts(window.end),
            ts(window.start)
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn list_active_locks(
        &self,
        shift_ids: &[Uuid],
        window: TimeInterval,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Lock>> {
        if shift_ids.is_empty() {
            return Ok(vec![]);
        }

        let path = format!(
            "/rest/v1/reservation_locks?shift_id=in.({})&expires_at=gt.{}&start_time=lt.{}&end_time=gt.{}",
            id_list(shift_ids),
            ts(now),
            ts(window.end),
            ts(window.start)
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn insert_lock(&self, lock: NewLock, _now: DateTime<Utc>) -> StoreResult<Lock> {
        let body = serde_json::to_value(&lock)?;

        let rows: Vec<Lock> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/reservation_locks",
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound("inserted lock was not returned".to_string()))
    }

    async fn delete_session_locks_near(
        &self,
        session_token: &str,
        start_time: DateTime<Utc>,
        tolerance: Duration,
    ) -> StoreResult<u64> {
        let (lower, upper) = tolerance_window(start_time, tolerance);
        let path = format!(
            "/rest/v1/reservation_locks?session_token=eq.{}&start_time=gte.{}&start_time=lte.{}",
            urlencoding::encode(session_token),
            ts(lower),
            ts(upper)
        );

        let deleted: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            Some(SupabaseClient::return_representation()),
        ).await?;

        Ok(deleted.len() as u64)
    }

    async fn delete_session_locks(&self, session_token: &str) -> StoreResult<u64> {
        let path = format!(
            "/rest/v1/reservation_locks?session_token=eq.{}",
            urlencoding::encode(session_token)
        );

        let deleted: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            Some(SupabaseClient::return_representation()),
        ).await?;

        Ok(deleted.len() as u64)
    }

    async fn list_add_ons(&self, service_id: Uuid) -> StoreResult<Vec<AddOn>> {
        let path = format!(
            "/rest/v1/service_add_ons?service_id=eq.{}&is_active=eq.true",
            service_id
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn commit_booking(
        &self,
        booking: NewBooking,
        add_ons: Vec<NewBookingAddOn>,
        _now: DateTime<Utc>,
    ) -> StoreResult<Booking> {
        let body = json!({
            "p_booking": booking,
            "p_add_ons": add_ons,
        });

        let created: Booking = self.supabase.request(
            Method::POST,
            "/rest/v1/rpc/commit_booking",
            Some(body),
        ).await?;

        info!("Booking {} committed on shift {}", created.id, created.shift_id);
        Ok(created)
    }
}

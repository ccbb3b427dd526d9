use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingConfig, StorageBackend};
use shared_models::{
    AddOn, BlackoutPeriod, Booking, BookingStatus, Lock, NewBooking, Service, Shift,
};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub storage_backend: StorageBackend,
    pub scheduling: SchedulingConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            storage_backend: StorageBackend::Memory,
            scheduling: SchedulingConfig::default(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            storage_backend: StorageBackend::Supabase,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            storage_backend: self.storage_backend,
            server_port: 0,
            scheduling: self.scheduling.clone(),
        }
    }
}

/// `2025-03-10`, a Monday, used as the default schedule day.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, 0).unwrap())
}

/// Shorthand for an instant on [`test_date`].
pub fn on_test_day(hour: u32, minute: u32) -> DateTime<Utc> {
    at(test_date(), hour, minute)
}

/// Identifiers shared by a clinic fixture: one location, one staff member, one service.
#[derive(Debug, Clone, Copy)]
pub struct ClinicIds {
    pub location_id: Uuid,
    pub staff_id: Uuid,
    pub service_id: Uuid,
}

impl Default for ClinicIds {
    fn default() -> Self {
        Self {
            location_id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
        }
    }
}

impl ClinicIds {
    pub fn service(&self, duration_minutes: i64, lead_time_minutes: i64) -> Service {
        Service {
            id: self.service_id,
            name: "General consultation".to_string(),
            duration_minutes,
            buffer_minutes: 0,
            lead_time_minutes,
            price_eur_cents: 4500,
            is_active: true,
        }
    }

    pub fn shift(&self, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            staff_id: self.staff_id,
            location_id: self.location_id,
            start_time,
            end_time,
            qualified_service_ids: vec![self.service_id],
            is_active: true,
        }
    }

    pub fn blackout(&self, start_date: NaiveDate, end_date: NaiveDate) -> BlackoutPeriod {
        BlackoutPeriod {
            id: Uuid::new_v4(),
            location_id: self.location_id,
            start_date,
            end_date,
            reason: Some("Clinic closed".to_string()),
        }
    }

    pub fn add_on(&self, name: &str, price_eur_cents: i64) -> AddOn {
        AddOn {
            id: Uuid::new_v4(),
            service_id: self.service_id,
            name: name.to_string(),
            price_eur_cents,
            is_active: true,
        }
    }

    pub fn new_booking(
        &self,
        shift: &Shift,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> NewBooking {
        NewBooking {
            service_id: self.service_id,
            location_id: shift.location_id,
            staff_id: shift.staff_id,
            shift_id: shift.id,
            start_time,
            end_time,
            price_eur_cents: 4500,
            status: BookingStatus::Confirmed,
            client_name: "Test Client".to_string(),
            client_email: "client@example.com".to_string(),
            client_phone: None,
            notes: None,
            policy_answers: vec![],
        }
    }

    pub fn booking(
        &self,
        shift: &Shift,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Booking {
        let draft = self.new_booking(shift, start_time, end_time);
        Booking {
            id: Uuid::new_v4(),
            service_id: draft.service_id,
            location_id: draft.location_id,
            staff_id: draft.staff_id,
            shift_id: draft.shift_id,
            start_time,
            end_time,
            price_eur_cents: draft.price_eur_cents,
            status: draft.status,
            client_name: draft.client_name,
            client_email: draft.client_email,
            client_phone: None,
            notes: None,
            policy_answers: vec![],
            created_at: start_time - Duration::days(1),
        }
    }

    pub fn lock(
        &self,
        shift: &Shift,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        session_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Lock {
        Lock {
            id: Uuid::new_v4(),
            service_id: self.service_id,
            location_id: shift.location_id,
            staff_id: shift.staff_id,
            shift_id: shift.id,
            start_time,
            end_time,
            session_token: session_token.to_string(),
            expires_at,
            created_at: expires_at - Duration::minutes(30),
        }
    }
}

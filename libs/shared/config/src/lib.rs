use std::env;
use std::str::FromStr;

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Supabase,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub storage_backend: StorageBackend,
    pub server_port: u16,
    pub scheduling: SchedulingConfig,
}

/// Tunables of the availability and reservation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Spacing of candidate slot starts, independent of service duration.
    pub slot_step_minutes: i64,
    pub lock_ttl_minutes: i64,
    /// Window around a start time in which a session's previous lock is replaced.
    pub lock_refresh_tolerance_seconds: i64,
    /// Offset of the zone used for day boundaries, in minutes east of UTC.
    pub reference_utc_offset_minutes: i32,
    pub max_heatmap_days: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_step_minutes: 15,
            lock_ttl_minutes: 30,
            lock_refresh_tolerance_seconds: 60,
            reference_utc_offset_minutes: 0,
            max_heatmap_days: 62,
        }
    }
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            slot_step_minutes: positive_var("SLOT_STEP_MINUTES", defaults.slot_step_minutes),
            lock_ttl_minutes: positive_var("LOCK_TTL_MINUTES", defaults.lock_ttl_minutes),
            lock_refresh_tolerance_seconds: parsed_var(
                "LOCK_REFRESH_TOLERANCE_SECONDS",
                defaults.lock_refresh_tolerance_seconds,
            )
            .max(0),
            reference_utc_offset_minutes: parsed_var(
                "REFERENCE_UTC_OFFSET_MINUTES",
                defaults.reference_utc_offset_minutes,
            ),
            max_heatmap_days: positive_var("MAX_HEATMAP_DAYS", defaults.max_heatmap_days),
        };

        if config.reference_zone_opt().is_none() {
            warn!(
                "REFERENCE_UTC_OFFSET_MINUTES={} is out of range, using UTC",
                config.reference_utc_offset_minutes
            );
            return Self {
                reference_utc_offset_minutes: 0,
                ..config
            };
        }

        config
    }

    pub fn slot_step(&self) -> Duration {
        Duration::try_minutes(self.slot_step_minutes).unwrap_or(Duration::MAX)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::try_minutes(self.lock_ttl_minutes).unwrap_or(Duration::MAX)
    }

    pub fn lock_refresh_tolerance(&self) -> Duration {
        Duration::try_seconds(self.lock_refresh_tolerance_seconds).unwrap_or(Duration::MAX)
    }

    /// Zone in which calendar days start and end. Falls back to UTC for an
    /// offset chrono cannot represent.
    pub fn reference_zone(&self) -> FixedOffset {
        self.reference_zone_opt().unwrap_or_else(|| Utc.fix())
    }

    fn reference_zone_opt(&self) -> Option<FixedOffset> {
        self.reference_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            storage_backend: match env::var("STORAGE_BACKEND").as_deref() {
                Ok("memory") => StorageBackend::Memory,
                Ok("supabase") | Err(_) => StorageBackend::Supabase,
                Ok(other) => {
                    warn!("Unknown STORAGE_BACKEND '{}', using supabase", other);
                    StorageBackend::Supabase
                }
            },
            server_port: parsed_var("SERVER_PORT", 3000),
            scheduling: SchedulingConfig::from_env(),
        };

        if config.storage_backend == StorageBackend::Supabase && !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}

fn parsed_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn positive_var(name: &str, default: i64) -> i64 {
    let value = parsed_var(name, default);
    if value <= 0 {
        warn!("{} must be positive, using default {}", name, default);
        return default;
    }
    value
}

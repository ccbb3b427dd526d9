// libs/shared/utils/src/time.rs
use std::sync::RwLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use shared_models::TimeInterval;

/// Half-open overlap: an interval ending exactly when the other begins does not overlap.
pub fn intervals_overlap(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.overlaps(b)
}

/// First instant of `date` in `zone`, expressed in UTC. `None` when the instant
/// falls outside chrono's representable range.
pub fn start_of_day(date: NaiveDate, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let offset = Duration::try_seconds(i64::from(zone.local_minus_utc()))?;
    local_midnight.checked_sub_signed(offset).map(|utc| utc.and_utc())
}

/// Last millisecond of `date` in `zone` (inclusive bound).
pub fn end_of_day(date: NaiveDate, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    day_interval(date, zone)?
        .end
        .checked_sub_signed(Duration::try_milliseconds(1)?)
}

/// The whole day as a half-open interval ending at the next local midnight.
pub fn day_interval(date: NaiveDate, zone: &FixedOffset) -> Option<TimeInterval> {
    let start = start_of_day(date, zone)?;
    let end = start.checked_add_signed(Duration::try_days(1)?)?;
    Some(TimeInterval::new(start, end))
}

/// Half-open interval spanning every day from `from` to `to` inclusive.
pub fn days_interval(from: NaiveDate, to: NaiveDate, zone: &FixedOffset) -> Option<TimeInterval> {
    Some(TimeInterval::new(start_of_day(from, zone)?, day_interval(to, zone)?.end))
}

/// `None` on overflow rather than panicking.
pub fn add_minutes(at: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    at.checked_add_signed(Duration::try_minutes(minutes)?)
}

/// Source of "now" for lead-time and lock-expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: RwLock::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = TimeInterval::new(at(9, 0), at(9, 30));
        let b = TimeInterval::new(at(9, 30), at(10, 0));

        assert!(!intervals_overlap(&a, &b));
        assert!(!intervals_overlap(&b, &a));
    }

    #[test]
    fn test_partial_and_nested_overlap() {
        let a = TimeInterval::new(at(9, 0), at(9, 30));
        let partial = TimeInterval::new(at(9, 15), at(9, 45));
        let nested = TimeInterval::new(at(9, 5), at(9, 10));

        assert!(intervals_overlap(&a, &partial));
        assert!(intervals_overlap(&partial, &a));
        assert!(intervals_overlap(&a, &nested));
    }

    #[test]
    fn test_day_bounds_in_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        assert_eq!(start_of_day(date, &utc()), Some(at(0, 0)));
        assert_eq!(
            end_of_day(date, &utc()),
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 23, 59, 59).unwrap() + Duration::milliseconds(999))
        );
        assert_eq!(
            day_interval(date, &utc()).unwrap().end,
            Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_day_bounds_follow_reference_zone() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();

        assert_eq!(
            start_of_day(date, &cet),
            Some(Utc.with_ymd_and_hms(2025, 3, 9, 23, 0, 0).unwrap())
        );
        assert_eq!(
            day_interval(date, &cet).unwrap().end,
            Utc.with_ymd_and_hms(2025, 3, 10, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_days_interval_spans_both_ends() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();

        let window = days_interval(from, to, &utc()).unwrap();

        assert_eq!(window.start, at(0, 0));
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 3, 13, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_bounds_at_calendar_limits_are_none() {
        let east = FixedOffset::east_opt(3600).unwrap();

        assert_eq!(day_interval(NaiveDate::MAX, &utc()), None);
        assert_eq!(end_of_day(NaiveDate::MAX, &utc()), None);
        assert_eq!(start_of_day(NaiveDate::MIN, &east), None);
        assert_eq!(days_interval(new_year(), NaiveDate::MAX, &utc()), None);
    }

    fn new_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_add_minutes() {
        assert_eq!(add_minutes(at(11, 45), 30), Some(at(12, 15)));
        assert_eq!(add_minutes(at(11, 45), -45), Some(at(11, 0)));
    }

    #[test]
    fn test_add_minutes_overflow_is_none() {
        assert_eq!(add_minutes(at(8, 0), i64::MAX), None);
        assert_eq!(add_minutes(at(8, 0), 200_000_000_000), None);
        assert_eq!(add_minutes(DateTime::<Utc>::MAX_UTC, 1), None);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(at(8, 0));
        clock.advance(Duration::minutes(31));

        assert_eq!(clock.now(), at(8, 31));

        clock.set(at(10, 0));
        assert_eq!(clock.now(), at(10, 0));
    }
}

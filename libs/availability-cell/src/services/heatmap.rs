use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::DayAvailability;

/// One entry per requested date, in request order; dates missing from
/// `per_day_slots` count as zero.
pub fn summarize_day_heatmap(
    dates: &[NaiveDate],
    per_day_slots: &HashMap<String, usize>,
) -> Vec<DayAvailability> {
    dates
        .iter()
        .map(|date| {
            let key = date.format("%Y-%m-%d").to_string();
            let available_slots = per_day_slots.get(&key).copied().unwrap_or(0);
            DayAvailability { date: key, available_slots }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_missing_days_default_to_zero() {
        let mut counts = HashMap::new();
        counts.insert("2025-03-11".to_string(), 12);

        let heatmap = summarize_day_heatmap(&[day(10), day(11), day(12)], &counts);

        assert_eq!(
            heatmap,
            vec![
                DayAvailability { date: "2025-03-10".to_string(), available_slots: 0 },
                DayAvailability { date: "2025-03-11".to_string(), available_slots: 12 },
                DayAvailability { date: "2025-03-12".to_string(), available_slots: 0 },
            ]
        );
    }

    #[test]
    fn test_counts_outside_requested_dates_are_ignored() {
        let mut counts = HashMap::new();
        counts.insert("2025-04-01".to_string(), 5);

        let heatmap = summarize_day_heatmap(&[day(1)], &counts);

        assert_eq!(heatmap.len(), 1);
        assert_eq!(heatmap[0].available_slots, 0);
    }

    #[test]
    fn test_empty_range() {
        assert!(summarize_day_heatmap(&[], &HashMap::new()).is_empty());
    }
}

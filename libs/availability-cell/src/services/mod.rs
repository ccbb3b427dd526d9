pub mod slots;
pub mod heatmap;
pub mod availability;

pub use availability::AvailabilityService;
pub use heatmap::summarize_day_heatmap;
pub use slots::generate_slots_for_day;

pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{AvailabilityError, DayAvailability, Slot, SlotGenerationInput, SlotGrid};
pub use router::availability_routes;
pub use services::{generate_slots_for_day, summarize_day_heatmap, AvailabilityService};

pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{AddOnSelection, BookingError, CreateBookingRequest};
pub use router::booking_routes;
pub use services::{price_with_add_ons, resolve_add_ons, BookingCommitService};

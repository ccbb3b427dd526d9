pub mod addons;
pub mod commit;

pub use addons::{price_with_add_ons, resolve_add_ons};
pub use commit::BookingCommitService;

pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{AcquireLockRequest, LockAcquired, LockError, LocksReleased, ReleaseLocksRequest};
pub use router::reservation_routes;
pub use services::ReservationLockService;

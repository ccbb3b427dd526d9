pub mod lock;

pub use lock::ReservationLockService;

pub mod error;
pub mod interval;
pub mod scheduling;

pub use interval::TimeInterval;
pub use scheduling::*;

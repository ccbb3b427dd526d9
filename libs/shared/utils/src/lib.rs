pub mod time;
pub mod test_utils;

pub use time::{Clock, FixedClock, SystemClock};

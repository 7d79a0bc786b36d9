pub mod calendar;
pub mod sync;
pub mod triggers;

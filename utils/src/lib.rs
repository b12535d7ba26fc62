//! Shared helpers with no domain logic of their own.

pub mod logging;
pub mod time;

pub use logging::init_tracing;
pub use time::seconds_to_next_hour;

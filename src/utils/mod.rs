//! Shared helpers
//!
//! Logging setup, timing and phone-number rules.

pub mod logger;
pub mod phone;
pub mod timer;

pub use logger::{init_logger, LogLevel};
pub use timer::Timer;

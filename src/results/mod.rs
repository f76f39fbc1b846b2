//! Results storage module
//!
//! Keeps past probe runs on disk for later inspection.

mod storage;

pub use storage::{ResultsStorage, StoredRun};

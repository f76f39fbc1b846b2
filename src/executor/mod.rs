//! Probe execution engine
//!
//! Suites run sequentially; the admin JWT obtained by one suite is reused by
//! the next.

mod runner;

pub use runner::SuiteRunner;

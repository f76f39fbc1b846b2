//! Data models for API probing
//!
//! Probe results, suites, request payloads and fixtures.

mod api;
pub mod fixtures;
mod suite;
mod test_result;

pub use api::{
    ComparablesQuery, EstimateRequest, LeadComment, LeadSubmission, LeadUpdate, LoginRequest,
    MarketQuery, OtpRequest,
};
pub use fixtures::{Location, PhoneFixtures, Property};
pub use suite::Suite;
pub use test_result::{RunSummary, TestResult, TestStatus};

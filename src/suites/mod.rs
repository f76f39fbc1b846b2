//! Probe suites against the estimation API
//!
//! Each probe sends one or two requests, inspects the status code and JSON
//! shape, and yields a [`Verdict`]. Transport failures surface as
//! [`HttpError`] and are recorded as ERROR results without stopping the run.
//!
//! ## Suites
//!
//! 1. Core: health, geocoding, DVF comparables, market listings, 404
//! 2. Auth: admin login, JWT-protected endpoints
//! 3. Estimate: full estimation and validation
//! 4. Leads: submission and admin lifecycle
//! 5. Otp: SMS verification endpoints and the bypass number
//! 6. Locations: estimation survey across French cities (diagnostic)
//! 7. DvfDates: comparables across lookback windows (diagnostic)

mod auth;
mod core;
mod dvf_dates;
mod estimate;
pub(crate) mod expect;
mod leads;
mod locations;
mod otp;

use serde_json::Value;
use std::future::Future;
use tracing::{info, warn};

use crate::config::{AdminCredentials, Settings};
use crate::http::{ApiClient, HttpError};
use crate::models::{PhoneFixtures, Property, Suite, TestResult, TestStatus};
use crate::utils::Timer;

/// Verdict of one probe before it is attributed to a suite and name
#[derive(Clone, Debug)]
pub struct Verdict {
    pub status: TestStatus,
    pub message: String,
    pub response: Option<Value>,
}

impl Verdict {
    fn new(status: TestStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            response: None,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(TestStatus::Pass, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(TestStatus::Fail, message)
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self::new(TestStatus::Skip, reason)
    }

    /// Pass when `ok`, fail otherwise
    pub fn check(ok: bool, message: impl Into<String>) -> Self {
        if ok {
            Self::pass(message)
        } else {
            Self::fail(message)
        }
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }
}

/// Outcome of one probe
pub type Outcome = Result<Verdict, HttpError>;

/// State shared by the suites of one run
pub struct RunContext {
    pub client: ApiClient,
    pub admin: AdminCredentials,
    pub property: Property,
    pub phones: PhoneFixtures,
    pub estimate_timeout_secs: u64,
    /// Admin JWT obtained by the login probe
    pub token: Option<String>,
    /// Lead created by the lead lifecycle probes
    pub lead_id: Option<String>,
}

impl RunContext {
    pub fn new(client: ApiClient, admin: AdminCredentials, bypass_phone: &str) -> Self {
        Self {
            client,
            admin,
            property: Property::default(),
            phones: PhoneFixtures::new(bypass_phone),
            estimate_timeout_secs: 30,
            token: None,
            lead_id: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, HttpError> {
        let client = ApiClient::new(&settings.base_url, settings.timeout_secs)?;
        let mut ctx = Self::new(client, settings.admin.clone(), &settings.bypass_phone);
        ctx.estimate_timeout_secs = settings.estimate_timeout_secs;
        Ok(ctx)
    }
}

/// Append-only record of probe results
#[derive(Debug, Default)]
pub struct ResultLog {
    results: Vec<TestResult>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute an outcome to a probe, print its line and append it
    pub fn record(
        &mut self,
        suite: Suite,
        name: impl Into<String>,
        timer: Timer,
        outcome: Outcome,
    ) -> TestStatus {
        let name = name.into();
        let result = match outcome {
            Ok(verdict) => {
                let result = TestResult::new(suite, name, verdict.status, verdict.message);
                match verdict.response {
                    Some(response) => result.with_response(response),
                    None => result,
                }
            }
            Err(e) => {
                warn!("{} / {}: {}", suite.name(), name, e);
                TestResult::error(suite, name, format!("Request failed: {e}"))
            }
        }
        .with_duration(timer.stop());

        info!("{}", result);
        let status = result.status;
        self.results.push(result);
        status
    }

    /// Time a probe future and record its outcome
    pub async fn probe(
        &mut self,
        suite: Suite,
        name: impl Into<String>,
        probe: impl Future<Output = Outcome>,
    ) -> TestStatus {
        let name = name.into();
        let timer = Timer::start(name.as_str());
        let outcome = probe.await;
        self.record(suite, name, timer, outcome)
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }
}

/// Run one suite, appending its results to `log`
pub async fn run_suite(suite: Suite, ctx: &mut RunContext, log: &mut ResultLog) {
    match suite {
        Suite::Core => core::run(ctx, log).await,
        Suite::Auth => auth::run(ctx, log).await,
        Suite::Estimate => estimate::run(ctx, log).await,
        Suite::Leads => leads::run(ctx, log).await,
        Suite::Otp => otp::run(ctx, log).await,
        Suite::Locations => locations::run(ctx, log).await,
        Suite::DvfDates => dvf_dates::run(ctx, log).await,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_order_and_maps_errors() {
        let mut log = ResultLog::new();
        log.record(
            Suite::Core,
            "first",
            Timer::start("first"),
            Ok(Verdict::pass("ok")),
        );
        log.record(
            Suite::Core,
            "second",
            Timer::start("second"),
            Err(HttpError::Timeout(10)),
        );
        log.record(
            Suite::Auth,
            "third",
            Timer::start("third"),
            Ok(Verdict::skip("no token").with_response(serde_json::json!({}))),
        );

        let results = log.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "first");
        assert_eq!(results[1].status, TestStatus::Error);
        assert_eq!(results[1].message, "Request failed: Timeout after 10 seconds");
        assert_eq!(results[2].status, TestStatus::Skip);
        assert!(results[2].response.is_some());
    }

    #[test]
    fn test_verdict_check() {
        assert_eq!(Verdict::check(true, "").status, TestStatus::Pass);
        assert_eq!(Verdict::check(false, "").status, TestStatus::Fail);
    }

    #[tokio::test]
    async fn test_unreachable_api_records_errors() {
        let mut ctx = testing::unreachable_context();
        let mut log = ResultLog::new();

        run_suite(Suite::Core, &mut ctx, &mut log).await;

        assert_eq!(log.len(), 8);
        assert!(log
            .results()
            .iter()
            .all(|r| r.status == TestStatus::Error));
    }
}

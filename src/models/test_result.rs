//! Probe result models
//!
//! Defines result status, individual probe results and run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Suite;

/// Probe execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✅",
            TestStatus::Fail => "❌",
            TestStatus::Skip => "⏭",
            TestStatus::Error => "💥",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Pass)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Skip => "SKIP",
            TestStatus::Error => "ERROR",
        };
        f.pad(label)
    }
}

/// Result of a single probe
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestResult {
    pub suite: Suite,
    pub name: String,
    pub status: TestStatus,
    pub message: String,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl TestResult {
    pub fn new(
        suite: Suite,
        name: impl Into<String>,
        status: TestStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            suite,
            name: name.into(),
            status,
            message: message.into(),
            duration_ms: 0,
            timestamp: Utc::now(),
            response: None,
        }
    }

    pub fn error(suite: Suite, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(suite, name, TestStatus::Error, error.into())
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_response(mut self, response: serde_json::Value) -> Self {
        self.response = Some(response);
        self
    }
}

#[cfg(test)]
impl TestResult {
    pub fn pass(suite: Suite, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(suite, name, TestStatus::Pass, message)
    }

    pub fn fail(suite: Suite, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(suite, name, TestStatus::Fail, message)
    }

    pub fn skip(suite: Suite, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(suite, name, TestStatus::Skip, reason)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {} [{}ms]",
            self.status.symbol(),
            self.status,
            self.name,
            self.message,
            self.duration_ms
        )
    }
}

/// Summary of one probe run against a target
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total_duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    pub fn new(
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        results: Vec<TestResult>,
    ) -> Self {
        let count = |status: TestStatus| results.iter().filter(|r| r.status == status).count();

        Self {
            target: target.into(),
            started_at,
            completed_at: Utc::now(),
            total: results.len(),
            passed: count(TestStatus::Pass),
            failed: count(TestStatus::Fail),
            skipped: count(TestStatus::Skip),
            errors: count(TestStatus::Error),
            total_duration_ms: results.iter().map(|r| r.duration_ms).sum(),
            results,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }

    /// Results that did not pass, in execution order
    pub fn unsuccessful(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.status.is_success())
    }

    /// Results belonging to one suite
    pub fn for_suite(&self, suite: Suite) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(move |r| r.suite == suite)
    }

    pub fn meets(&self, min_pass_rate: f64) -> bool {
        self.total > 0 && self.pass_rate() >= min_pass_rate
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Probe run against {}", self.target)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {} | Error: {}",
            self.total, self.passed, self.failed, self.skipped, self.errors
        )?;
        writeln!(
            f,
            "Success Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}

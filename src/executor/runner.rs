//! Probe run execution
//!
//! Runs the selected suites one after another against a single deployment.

use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Instant;
use tracing::info;

use crate::config::Settings;
use crate::models::{RunSummary, Suite};
use crate::suites::{self, ResultLog, RunContext};

/// Sequential runner over a set of suites
pub struct SuiteRunner {
    ctx: RunContext,
    suites: Vec<Suite>,
}

impl SuiteRunner {
    /// Create a runner from resolved settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let ctx = RunContext::from_settings(settings)
            .with_context(|| format!("Failed to create client for {}", settings.base_url))?;
        Ok(Self::with_context(ctx, settings.suites.clone()))
    }

    pub fn with_context(ctx: RunContext, suites: Vec<Suite>) -> Self {
        Self {
            ctx,
            suites: dedup(suites),
        }
    }

    /// Run every selected suite and summarise the results
    pub async fn run(mut self) -> RunSummary {
        let target = self.ctx.client.base_url().to_string();
        let started_at = Utc::now();
        let start = Instant::now();

        info!("🚀 Starting AlterEgo API probes");
        info!("Base URL: {}", target);
        info!("Suites: {}", names(&self.suites));

        let mut log = ResultLog::new();
        for &suite in &self.suites {
            info!("=== {} ===", suite);
            let before = log.len();
            suites::run_suite(suite, &mut self.ctx, &mut log).await;
            let suite_results = &log.results()[before..];
            info!(
                "{} completed: {}/{} passed",
                suite.name(),
                suite_results.iter().filter(|r| r.status.is_success()).count(),
                suite_results.len()
            );
        }

        let summary = RunSummary::new(target, started_at, log.into_results());

        info!(
            "Run completed in {}ms - Pass: {}/{} ({:.1}%)",
            start.elapsed().as_millis(),
            summary.passed,
            summary.total,
            summary.pass_rate()
        );

        summary
    }
}

/// Drop repeated suites, keeping first occurrence order
fn dedup(suites: Vec<Suite>) -> Vec<Suite> {
    let mut seen = Vec::with_capacity(suites.len());
    for suite in suites {
        if !seen.contains(&suite) {
            seen.push(suite);
        }
    }
    seen
}

fn names(suites: &[Suite]) -> String {
    suites
        .iter()
        .map(|s| s.slug())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStatus;
    use crate::suites::testing::{context, unreachable_context};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_dedup_keeps_order() {
        assert_eq!(
            dedup(vec![Suite::Otp, Suite::Core, Suite::Otp, Suite::Auth, Suite::Core]),
            vec![Suite::Otp, Suite::Core, Suite::Auth]
        );
    }

    #[test]
    fn test_new_from_settings() {
        use crate::config::{CliOverrides, ConfigFile, EnvConfig};

        let cli = CliOverrides {
            base_url: Some("http://localhost:3000/api".to_string()),
            suites: vec![Suite::Core, Suite::Core, Suite::Otp],
            ..Default::default()
        };
        let settings = Settings::resolve(&ConfigFile::default(), &EnvConfig::default(), cli).unwrap();

        let runner = tokio_test::assert_ok!(SuiteRunner::new(&settings));
        assert_eq!(runner.suites, vec![Suite::Core, Suite::Otp]);
    }

    #[tokio::test]
    async fn test_run_summarises_all_suites() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/estimate"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "Missing required parameters" })),
            )
            .mount(&server)
            .await;

        let runner = SuiteRunner::with_context(context(&server).await, vec![Suite::Estimate]);
        let summary = runner.run().await;

        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.target.ends_with("/api"));
        assert!(!summary.meets(100.0));
    }

    #[tokio::test]
    async fn test_unreachable_target_errors_without_aborting() {
        let runner =
            SuiteRunner::with_context(unreachable_context(), vec![Suite::Estimate, Suite::Auth]);
        let summary = runner.run().await;

        assert_eq!(summary.total, 9);
        // Authenticated probes skip once login has errored
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.errors, 7);
        assert!(summary
            .results
            .iter()
            .filter(|r| r.status == TestStatus::Error)
            .all(|r| r.message.starts_with("Request failed:")));
    }
}

//! Estimation survey across French locations
//!
//! Diagnoses estimations that come back without DVF comparables by probing
//! several cities and a few parameter extremes.

use std::fmt;

use serde_json::{json, Value};
use tracing::info;

use super::expect;
use super::{Outcome, ResultLog, RunContext, Verdict};
use crate::http::ApiRequest;
use crate::models::fixtures::{edge_cases, survey_locations};
use crate::models::{Location, Suite, TestResult};

const SUITE: Suite = Suite::Locations;

pub async fn run(ctx: &mut RunContext, log: &mut ResultLog) {
    let locations = survey_locations();
    let first = log.len();

    for location in &locations {
        log.probe(SUITE, format!("Location: {}", location.name), estimate(ctx, location))
            .await;
    }
    let survey = &log.results()[first..];
    let conclusion = Conclusion::from_results(survey, &locations);

    let edges = edge_cases();
    for case in &edges {
        log.probe(SUITE, format!("Edge case: {}", case.name), estimate(ctx, case))
            .await;
    }

    info!("{}", conclusion);
}

async fn estimate(ctx: &RunContext, location: &Location) -> Outcome {
    let request = ApiRequest::post("/estimate")
        .json(&location.estimate())?
        .timeout(ctx.estimate_timeout_secs);
    let resp = ctx.client.send(request).await?;
    if resp.status != 200 {
        return Ok(Verdict::fail(format!(
            "HTTP {}: {}",
            resp.status,
            resp.preview(200)
        )));
    }

    let data = resp.json()?;
    let dvf = data.get("dvf").cloned().unwrap_or(Value::Null);
    let count = expect::count(&dvf, "count");
    let radius = expect::show(dvf.get("radius"));
    let months = expect::show(dvf.get("months"));

    if count == 0 {
        let warning = dvf
            .get("warning")
            .and_then(Value::as_str)
            .unwrap_or("No warning");
        return Ok(Verdict::fail(format!(
            "0 comparables - {warning} (radius {radius}m, months {months})"
        )));
    }

    let stats = dvf.get("stats").filter(|s| !s.is_null());
    let mean = expect::show(stats.and_then(|s| s.get("meanPricePerM2")));
    let confidence = expect::show(stats.and_then(|s| s.get("confidenceIndex")));

    Ok(Verdict::pass(format!(
        "{count} comparables, €{mean}/m², confidence {confidence}%, radius {radius}m, months {months}"
    ))
    .with_response(json!({ "count": count, "radius": dvf.get("radius"), "months": dvf.get("months") })))
}

/// Overall reading of the location survey
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conclusion {
    AllWork,
    Systematic,
    Partial { failing: Vec<String> },
}

impl Conclusion {
    /// Classify survey results, which are in the same order as `locations`
    pub fn from_results(results: &[TestResult], locations: &[Location]) -> Self {
        let failing: Vec<String> = results
            .iter()
            .zip(locations)
            .filter(|(r, _)| !r.status.is_success())
            .map(|(_, l)| l.name.clone())
            .collect();

        if failing.is_empty() {
            Conclusion::AllWork
        } else if failing.len() == results.len() {
            Conclusion::Systematic
        } else {
            Conclusion::Partial { failing }
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conclusion::AllWork => write!(
                f,
                "✅ CONCLUSION: All locations work - the issue may be resolved or intermittent"
            ),
            Conclusion::Systematic => {
                write!(f, "❌ CONCLUSION: Systematic issue - no locations work")
            }
            Conclusion::Partial { failing } => write!(
                f,
                "⚠️ CONCLUSION: Partial issue - failing locations: {}",
                failing.join(", ")
            ),
        }
    }
}

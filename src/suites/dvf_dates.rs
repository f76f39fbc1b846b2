//! DVF date-range diagnostics
//!
//! Checks whether missing comparables come from date filtering by sweeping
//! the lookback window and comparing `/estimate` with the direct query.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use super::expect;
use super::{Outcome, ResultLog, RunContext, Verdict};
use crate::http::{ApiRequest, ApiResponse, HttpError};
use crate::models::fixtures::{
    date_probe_location, DATE_PROBE_RADIUS, MONTH_SWEEP, WIDE_LOOKBACK_MONTHS,
};
use crate::models::Suite;

const SUITE: Suite = Suite::DvfDates;

/// Lookback the API applies by default
const DEFAULT_LOOKBACK_MONTHS: i64 = 24;

pub async fn run(ctx: &mut RunContext, log: &mut ResultLog) {
    for months in MONTH_SWEEP {
        log.probe(SUITE, format!("Lookback {months} months"), lookback(ctx, months))
            .await;
    }
    log.probe(SUITE, "Estimate vs direct comparables", estimate_vs_direct(ctx))
        .await;
    log.probe(
        SUITE,
        format!("Wide lookback {WIDE_LOOKBACK_MONTHS} months"),
        wide_lookback(ctx),
    )
    .await;
}

async fn comparables(ctx: &RunContext, months: u32) -> Result<ApiResponse, HttpError> {
    let query = date_probe_location()
        .property
        .comparables()
        .radius(DATE_PROBE_RADIUS)
        .months(months);
    ctx.client
        .send(ApiRequest::get("/dvf/comparables").params(query.to_params()))
        .await
}

/// Earliest and latest `date` among comparables
pub fn date_range(data: &Value) -> Option<(String, String)> {
    let mut dates: Vec<&str> = data
        .get("comparables")?
        .as_array()?
        .iter()
        .filter_map(|c| c.get("date").and_then(Value::as_str))
        .filter(|d| !d.is_empty())
        .collect();
    dates.sort_unstable();

    let first = dates.first()?;
    let last = dates.last()?;
    Some((first.to_string(), last.to_string()))
}

/// Date a lookback of `months` (30-day months) starts from
pub fn cutoff_date(now: DateTime<Utc>, months: i64) -> String {
    (now - Duration::days(months * 30))
        .format("%Y-%m-%d")
        .to_string()
}

fn describe_range(data: &Value) -> String {
    match date_range(data) {
        Some((first, last)) => format!("dates {first} to {last}"),
        None => "no dated comparables".to_string(),
    }
}

async fn lookback(ctx: &RunContext, months: u32) -> Outcome {
    let resp = comparables(ctx, months).await?;
    if resp.status != 200 {
        return Ok(expect::unexpected(&resp));
    }

    let data = resp.json()?;
    let count = expect::count(&data, "count");
    let mut message = format!("count {count}");

    if count > 0 {
        let mean = data.get("stats").and_then(|s| s.get("meanPricePerM2"));
        message.push_str(&format!(", mean €{}/m²", expect::show(mean)));
    }
    if let Some(warning) = data.get("warning").and_then(Value::as_str) {
        message.push_str(&format!(", warning: {warning}"));
    }
    message.push_str(&format!(", {}", describe_range(&data)));

    Ok(Verdict::pass(message))
}

async fn estimate_vs_direct(ctx: &RunContext) -> Outcome {
    let direct = comparables(ctx, DEFAULT_LOOKBACK_MONTHS as u32).await?;
    if direct.status != 200 {
        return Ok(Verdict::fail(format!(
            "Direct comparables: HTTP {}",
            direct.status
        )));
    }
    let direct_count = expect::count(&direct.json()?, "count");

    let request = ApiRequest::post("/estimate")
        .json(&date_probe_location().estimate())?
        .timeout(ctx.estimate_timeout_secs);
    let estimate = ctx.client.send(request).await?;
    if estimate.status != 200 {
        return Ok(Verdict::fail(format!(
            "Estimate: HTTP {}",
            estimate.status
        )));
    }

    let data = estimate.json()?;
    let dvf = data.get("dvf").cloned().unwrap_or(Value::Null);
    Ok(Verdict::pass(format!(
        "direct count {} vs estimate count {} (estimate used radius {}m, months {})",
        direct_count,
        expect::count(&dvf, "count"),
        expect::show(dvf.get("radius")),
        expect::show(dvf.get("months"))
    )))
}

async fn wide_lookback(ctx: &RunContext) -> Outcome {
    let resp = comparables(ctx, WIDE_LOOKBACK_MONTHS).await?;
    if resp.status != 200 {
        return Ok(expect::unexpected(&resp));
    }

    let data = resp.json()?;
    let now = Utc::now();
    Ok(Verdict::pass(format!(
        "count {}, {}, expected {}-month window {} to {}",
        expect::count(&data, "count"),
        describe_range(&data),
        DEFAULT_LOOKBACK_MONTHS,
        cutoff_date(now, DEFAULT_LOOKBACK_MONTHS),
        now.format("%Y-%m-%d")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStatus;
    use crate::suites::testing::{context, status_of};
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_date_range() {
        let data = json!({
            "comparables": [
                { "date": "2023-05-02" },
                { "date": "2021-11-30" },
                { "price": 1 },
                { "date": "2024-01-15" }
            ]
        });
        assert_eq!(
            date_range(&data),
            Some(("2021-11-30".to_string(), "2024-01-15".to_string()))
        );
        assert_eq!(date_range(&json!({ "comparables": [] })), None);
        assert_eq!(date_range(&json!({})), None);
    }

    #[test]
    fn test_cutoff_date() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(cutoff_date(now, 24), "2023-02-11");
    }

    #[tokio::test]
    async fn test_date_suite() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dvf/comparables"))
            .and(query_param("radiusMeters", "500"))
            .and(query_param("months", "6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 0,
                "comparables": [],
                "warning": "Insufficient comparables"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/dvf/comparables"))
            .and(query_param("radiusMeters", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "stats": { "meanPricePerM2": 13200 },
                "comparables": [{ "date": "2023-06-01" }, { "date": "2022-03-15" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/estimate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dvf": { "count": 9, "radius": 1000, "months": 36 }
            })))
            .mount(&server)
            .await;

        let mut ctx = context(&server).await;
        let mut log = ResultLog::new();
        run(&mut ctx, &mut log).await;

        assert_eq!(log.len(), 8);
        assert!(log.results().iter().all(|r| r.status == TestStatus::Pass));
        assert_eq!(
            log.results()[0].message,
            "count 0, warning: Insufficient comparables, no dated comparables"
        );
        assert_eq!(
            log.results()[3].message,
            "count 2, mean €13200/m², dates 2022-03-15 to 2023-06-01"
        );
        assert_eq!(
            log.results()[6].message,
            "direct count 2 vs estimate count 9 (estimate used radius 1000m, months 36)"
        );
        assert_eq!(status_of(&log, "Wide lookback 60 months"), TestStatus::Pass);
    }

    #[tokio::test]
    async fn test_estimate_failure_fails_comparison() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dvf/comparables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/estimate"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
            .mount(&server)
            .await;
        let ctx = context(&server).await;

        let verdict = estimate_vs_direct(&ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Fail);
        assert_eq!(verdict.message, "Estimate: HTTP 500");
    }
}

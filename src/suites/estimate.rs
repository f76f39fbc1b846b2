//! Estimation probes

use serde_json::{json, Value};

use super::expect;
use super::{Outcome, ResultLog, RunContext, Verdict};
use crate::http::ApiRequest;
use crate::models::{EstimateRequest, Suite};

const SUITE: Suite = Suite::Estimate;

const REQUIRED_FIELDS: [&str; 4] = ["dvf", "market", "delta", "estimatedValue"];

pub async fn run(ctx: &mut RunContext, log: &mut ResultLog) {
    log.probe(SUITE, "Full Estimation", full_estimation(ctx)).await;
    log.probe(SUITE, "Estimation Error Handling", missing_params(ctx))
        .await;
}

async fn full_estimation(ctx: &RunContext) -> Outcome {
    let request = ApiRequest::post("/estimate")
        .json(&ctx.property.estimate())?
        .timeout(ctx.estimate_timeout_secs);
    let resp = ctx.client.send(request).await?;
    if resp.status != 200 {
        return Ok(expect::unexpected(&resp));
    }

    let data = resp.json()?;
    let missing = expect::missing(&data, &REQUIRED_FIELDS);
    if !missing.is_empty() {
        return Ok(Verdict::fail(format!("Missing fields: {missing:?}")));
    }

    let dvf_count = expect::count(&data["dvf"], "count");
    let market_count = expect::array_len(&data["market"], "listings").unwrap_or(0);
    let estimated = expect::show(data.get("estimatedValue"));

    Ok(Verdict::pass(format!(
        "DVF: {dvf_count} comparables, Market: {market_count} listings, Estimated: €{estimated}"
    ))
    .with_response(json!({
        "dvf_count": dvf_count,
        "market_count": market_count,
        "estimated_value": data.get("estimatedValue").cloned().unwrap_or(Value::Null),
    })))
}

async fn missing_params(ctx: &RunContext) -> Outcome {
    let body = EstimateRequest::address_only(&ctx.property.address);
    let resp = ctx
        .client
        .send(ApiRequest::post("/estimate").json(&body)?)
        .await?;
    expect::error_response(&resp, 400, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStatus;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_full_estimation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/estimate"))
            .and(body_partial_json(json!({ "type": "appartement", "surface": 85.0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dvf": { "count": 14, "stats": {} },
                "market": { "listings": [{}, {}] },
                "delta": null,
                "estimatedValue": 892500
            })))
            .mount(&server)
            .await;
        let ctx = crate::suites::testing::context(&server).await;

        let verdict = full_estimation(&ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Pass);
        assert_eq!(
            verdict.message,
            "DVF: 14 comparables, Market: 2 listings, Estimated: €892500"
        );
    }

    #[tokio::test]
    async fn test_full_estimation_lists_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/estimate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dvf": {} })))
            .mount(&server)
            .await;
        let ctx = crate::suites::testing::context(&server).await;

        let verdict = full_estimation(&ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Fail);
        assert_eq!(
            verdict.message,
            r#"Missing fields: ["market", "delta", "estimatedValue"]"#
        );
    }

    #[tokio::test]
    async fn test_missing_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/estimate"))
            .and(body_partial_json(json!({ "address": "2 rue des italiens, 75009 Paris" })))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "Missing required parameters" })),
            )
            .mount(&server)
            .await;
        let ctx = crate::suites::testing::context(&server).await;

        let verdict = missing_params(&ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Pass);
        assert_eq!(
            verdict.message,
            "Correctly returned 400: Missing required parameters"
        );
    }
}

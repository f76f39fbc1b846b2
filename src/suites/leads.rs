//! Lead lifecycle probes
//!
//! Submits a lead, then walks it through the admin console operations:
//! listing, status and field updates, comments and deletion.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use super::auth::{self, NO_TOKEN};
use super::expect;
use super::{Outcome, ResultLog, RunContext, Verdict};
use crate::http::{ApiRequest, HttpError};
use crate::models::{LeadComment, LeadSubmission, LeadUpdate, Suite};

const SUITE: Suite = Suite::Leads;

const NO_LEAD: &str = "No lead id available (lead submission failed)";

pub async fn run(ctx: &mut RunContext, log: &mut ResultLog) {
    log.probe(SUITE, "Submit Lead", submit_lead(ctx)).await;

    if let Err(e) = auth::ensure_token(ctx).await {
        warn!("Admin login for lead management failed: {}", e);
    }

    log.probe(SUITE, "Lead Listed", lead_listed(ctx)).await;
    log.probe(SUITE, "Update Lead Status", update_status(ctx)).await;
    log.probe(SUITE, "Update Lead Fields", update_fields(ctx)).await;
    log.probe(SUITE, "Comment On Lead", comment(ctx)).await;
    log.probe(SUITE, "Update Lead Unauthorized", update_unauthorized(ctx))
        .await;
    log.probe(SUITE, "Delete Lead", delete(ctx)).await;
    log.probe(SUITE, "Lead Removed", lead_removed(ctx)).await;
}

fn submission(ctx: &RunContext) -> LeadSubmission {
    LeadSubmission {
        name: "Jean Dupont".to_string(),
        email: "jean.dupont@example.com".to_string(),
        phone: "+33123456789".to_string(),
        address: ctx.property.address.clone(),
        estimated_value: 450_000,
        message: "Interested in property estimation".to_string(),
    }
}

/// Token and lead id, or the reason the probe cannot run
fn prerequisites(ctx: &RunContext) -> Result<(&str, &str), Verdict> {
    let token = ctx.token.as_deref().ok_or_else(|| Verdict::skip(NO_TOKEN))?;
    let lead_id = ctx.lead_id.as_deref().ok_or_else(|| Verdict::skip(NO_LEAD))?;
    Ok((token, lead_id))
}

/// Ids of all leads visible to the admin, or the verdict explaining why
/// the listing was unusable
type Listing = Result<Vec<String>, Verdict>;

async fn lead_ids(ctx: &RunContext, token: &str) -> Result<Listing, HttpError> {
    let resp = ctx
        .client
        .send(ApiRequest::get("/leads").bearer(token))
        .await?;
    if resp.status != 200 {
        return Ok(Err(expect::unexpected(&resp)));
    }

    let data = resp.json()?;
    let Some(leads) = data.get("leads").and_then(Value::as_array) else {
        return Ok(Err(Verdict::fail("Missing leads array in response")));
    };

    Ok(Ok(leads
        .iter()
        .filter_map(|l| l.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()))
}

async fn submit_lead(ctx: &mut RunContext) -> Outcome {
    let resp = ctx
        .client
        .send(ApiRequest::post("/leads").json(&submission(ctx))?)
        .await?;
    if resp.status != 200 {
        return Ok(expect::unexpected(&resp));
    }

    let data = resp.json()?;
    let lead_id = data.get("leadId").and_then(Value::as_str);
    match lead_id {
        Some(id) if expect::flag(&data, "success") => {
            ctx.lead_id = Some(id.to_string());
            Ok(Verdict::pass(format!("Lead submitted successfully with ID: {id}"))
                .with_response(data))
        }
        _ => Ok(Verdict::fail("Missing success confirmation or leadId")),
    }
}

async fn lead_listed(ctx: &RunContext) -> Outcome {
    let (token, lead_id) = match prerequisites(ctx) {
        Ok(p) => p,
        Err(skip) => return Ok(skip),
    };

    Ok(match lead_ids(ctx, token).await? {
        Ok(ids) if ids.iter().any(|id| id == lead_id) => {
            Verdict::pass(format!("Lead {} present among {} leads", lead_id, ids.len()))
        }
        Ok(ids) => Verdict::fail(format!(
            "Lead {} missing from {} leads",
            lead_id,
            ids.len()
        )),
        Err(verdict) => verdict,
    })
}

async fn update_status(ctx: &RunContext) -> Outcome {
    let (token, lead_id) = match prerequisites(ctx) {
        Ok(p) => p,
        Err(skip) => return Ok(skip),
    };

    let body = LeadUpdate::status(lead_id, "contacted");
    let request = ApiRequest::post("/admin/leads/update")
        .json(&body)?
        .bearer(token);
    let resp = ctx.client.send(request).await?;
    expect::accepted(&resp, "Status set to contacted")
}

async fn update_fields(ctx: &RunContext) -> Outcome {
    let (token, lead_id) = match prerequisites(ctx) {
        Ok(p) => p,
        Err(skip) => return Ok(skip),
    };

    let body = LeadUpdate::field(lead_id, "message", json!("Updated by alterego-probe"));
    let request = ApiRequest::post("/admin/leads/update")
        .json(&body)?
        .bearer(token);
    let resp = ctx.client.send(request).await?;
    expect::accepted(&resp, "Field message updated")
}

async fn comment(ctx: &RunContext) -> Outcome {
    let (token, lead_id) = match prerequisites(ctx) {
        Ok(p) => p,
        Err(skip) => return Ok(skip),
    };

    let body = LeadComment {
        lead_id: lead_id.to_string(),
        comment: "Follow-up call scheduled".to_string(),
        author: ctx.admin.username.clone(),
        timestamp: Utc::now(),
    };
    let request = ApiRequest::post("/admin/leads/comment")
        .json(&body)?
        .bearer(token);
    let resp = ctx.client.send(request).await?;
    expect::accepted(&resp, format!("Comment added by {}", ctx.admin.username))
}

async fn update_unauthorized(ctx: &RunContext) -> Outcome {
    let lead_id = ctx.lead_id.as_deref().unwrap_or("00000000-0000-0000-0000-000000000000");
    let body = LeadUpdate::status(lead_id, "closed");
    let resp = ctx
        .client
        .send(ApiRequest::post("/admin/leads/update").json(&body)?)
        .await?;
    expect::error_response(&resp, 401, None)
}

async fn delete(ctx: &RunContext) -> Outcome {
    let (token, lead_id) = match prerequisites(ctx) {
        Ok(p) => p,
        Err(skip) => return Ok(skip),
    };

    let request = ApiRequest::delete("/admin/leads/delete")
        .param("leadId", lead_id)
        .bearer(token);
    let resp = ctx.client.send(request).await?;
    expect::accepted(&resp, format!("Lead {lead_id} deleted"))
}

async fn lead_removed(ctx: &RunContext) -> Outcome {
    let (token, lead_id) = match prerequisites(ctx) {
        Ok(p) => p,
        Err(skip) => return Ok(skip),
    };

    Ok(match lead_ids(ctx, token).await? {
        Ok(ids) if ids.iter().any(|id| id == lead_id) => {
            Verdict::fail(format!("Lead {lead_id} still listed after deletion"))
        }
        Ok(ids) => Verdict::pass(format!(
            "Lead {} no longer listed ({} leads remain)",
            lead_id,
            ids.len()
        )),
        Err(verdict) => verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStatus;
    use crate::suites::testing::{context, status_of};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LEAD: &str = "5b1c7c9e-0d4c-4a55-9a4e-1f1b2c3d4e5f";

    fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "success": true }))
    }

    #[tokio::test]
    async fn test_submit_lead_stores_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/leads"))
            .and(body_partial_json(json!({ "estimatedValue": 450000 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "leadId": LEAD })),
            )
            .mount(&server)
            .await;
        let mut ctx = context(&server).await;

        let verdict = submit_lead(&mut ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Pass);
        assert_eq!(ctx.lead_id.as_deref(), Some(LEAD));
    }

    #[tokio::test]
    async fn test_submit_lead_without_id_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;
        let mut ctx = context(&server).await;

        let verdict = submit_lead(&mut ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Fail);
        assert!(ctx.lead_id.is_none());
    }

    #[tokio::test]
    async fn test_admin_probes_skip_without_lead() {
        let server = MockServer::start().await;
        let mut ctx = context(&server).await;
        ctx.token = Some("jwt".to_string());

        let verdict = update_status(&ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Skip);
        assert_eq!(verdict.message, NO_LEAD);
    }

    #[tokio::test]
    async fn test_lead_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/leads"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "leadId": LEAD })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "jwt-123",
                "user": { "username": "Micael" }
            })))
            .mount(&server)
            .await;
        // Listed before deletion, gone after
        Mock::given(method("GET"))
            .and(path("/api/leads"))
            .and(header("authorization", "Bearer jwt-123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "leads": [{ "id": LEAD }, { "id": "other" }] })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/leads"))
            .and(header("authorization", "Bearer jwt-123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "leads": [{ "id": "other" }] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/leads/update"))
            .and(header("authorization", "Bearer jwt-123"))
            .respond_with(ok())
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/leads/update"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Unauthorized" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/leads/comment"))
            .and(body_partial_json(json!({ "leadId": LEAD, "author": "Micael" })))
            .respond_with(ok())
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/leads/delete"))
            .and(query_param("leadId", LEAD))
            .respond_with(ok())
            .mount(&server)
            .await;

        let mut ctx = context(&server).await;
        let mut log = ResultLog::new();
        run(&mut ctx, &mut log).await;

        assert_eq!(log.len(), 8);
        assert!(
            log.results().iter().all(|r| r.status == TestStatus::Pass),
            "{:#?}",
            log.results()
        );
        assert_eq!(status_of(&log, "Lead Removed"), TestStatus::Pass);
    }

    #[tokio::test]
    async fn test_lead_still_listed_after_delete_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "leads": [{ "id": LEAD }] })))
            .mount(&server)
            .await;
        let mut ctx = context(&server).await;
        ctx.token = Some("jwt".to_string());
        ctx.lead_id = Some(LEAD.to_string());

        let verdict = lead_removed(&ctx).await.unwrap();
        assert_eq!(verdict.status, TestStatus::Fail);
    }
}

//! Admin authentication probes
//!
//! The login probe stores the JWT in the run context for later suites.

use serde_json::{json, Value};
use tracing::debug;

use super::expect;
use super::{Outcome, ResultLog, RunContext, Verdict};
use crate::http::{ApiRequest, HttpError};
use crate::models::{LoginRequest, Suite};

const SUITE: Suite = Suite::Auth;

/// Bearer that is well-formed but not signed by the API
const BOGUS_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJ1c2VyIjoicHJvYmUifQ.invalid";

pub const NO_TOKEN: &str = "No JWT token available (admin login failed or was not run)";

pub async fn run(ctx: &mut RunContext, log: &mut ResultLog) {
    log.probe(SUITE, "Admin Login Success", login_success(ctx)).await;
    log.probe(SUITE, "Admin Login Failure", login_failure(ctx)).await;
    log.probe(SUITE, "Get Leads Unauthorized", leads_unauthorized(ctx))
        .await;
    log.probe(SUITE, "Get Leads Invalid Token", leads_invalid_token(ctx))
        .await;
    log.probe(SUITE, "Get Leads Authorized", leads_authorized(ctx))
        .await;
    log.probe(SUITE, "DVF Status Unauthorized", dvf_status_unauthorized(ctx))
        .await;
    log.probe(SUITE, "DVF Status", dvf_status(ctx)).await;
}

/// Log in with the configured admin account
///
/// Returns the response body on success so the caller can report the user.
async fn login(ctx: &RunContext) -> Result<(Option<String>, Value), HttpError> {
    let body = LoginRequest::new(&ctx.admin.username, &ctx.admin.password);
    let resp = ctx
        .client
        .send(ApiRequest::post("/auth/login").json(&body)?)
        .await?;
    if resp.status != 200 {
        return Ok((None, json!({ "status": resp.status, "body": resp.preview(200) })));
    }

    let data = resp.json()?;
    let token = data
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok((token, data))
}

/// Reuse the run's JWT, logging in first when no probe has done so yet
pub async fn ensure_token(ctx: &mut RunContext) -> Result<Option<String>, HttpError> {
    if ctx.token.is_none() {
        debug!("No JWT in context, logging in as {}", ctx.admin.username);
        let (token, _) = login(ctx).await?;
        ctx.token = token;
    }
    Ok(ctx.token.clone())
}

async fn login_success(ctx: &mut RunContext) -> Outcome {
    let (token, data) = login(ctx).await?;

    let Some(token) = token else {
        return Ok(Verdict::fail(format!("Login rejected: {data}")));
    };
    let Some(user) = data.get("user") else {
        return Ok(Verdict::fail("Missing token or user in response"));
    };

    let message = format!(
        "Login successful for user: {}",
        expect::show(user.get("username"))
    );
    let response = json!({ "token_received": true, "user": user });
    ctx.token = Some(token);

    Ok(Verdict::pass(message).with_response(response))
}

async fn login_failure(ctx: &RunContext) -> Outcome {
    let body = LoginRequest::new("wronguser", "wrongpass");
    let resp = ctx
        .client
        .send(ApiRequest::post("/auth/login").json(&body)?)
        .await?;
    expect::error_response(&resp, 401, None)
}

async fn leads_unauthorized(ctx: &RunContext) -> Outcome {
    let resp = ctx.client.send(ApiRequest::get("/leads")).await?;
    expect::error_response(&resp, 401, None)
}

async fn leads_invalid_token(ctx: &RunContext) -> Outcome {
    let resp = ctx
        .client
        .send(ApiRequest::get("/leads").bearer(BOGUS_TOKEN))
        .await?;
    expect::error_response(&resp, 401, None)
}

async fn leads_authorized(ctx: &RunContext) -> Outcome {
    let Some(token) = ctx.token.as_deref() else {
        return Ok(Verdict::skip(NO_TOKEN));
    };

    let resp = ctx
        .client
        .send(ApiRequest::get("/leads").bearer(token))
        .await?;
    if resp.status != 200 {
        return Ok(expect::unexpected(&resp));
    }

    let data = resp.json()?;
    match expect::array_len(&data, "leads") {
        Some(n) => Ok(Verdict::pass(format!("Retrieved {n} leads successfully"))
            .with_response(json!({ "leads_count": n }))),
        None => Ok(Verdict::fail("Missing leads array in response")),
    }
}

async fn dvf_status_unauthorized(ctx: &RunContext) -> Outcome {
    let resp = ctx.client.send(ApiRequest::get("/admin/dvf/status")).await?;
    expect::error_response(&resp, 401, None)
}

async fn dvf_status(ctx: &RunContext) -> Outcome {
    let Some(token) = ctx.token.as_deref() else {
        return Ok(Verdict::skip(NO_TOKEN));
    };

    let resp = ctx
        .client
        .send(ApiRequest::get("/admin/dvf/status").bearer(token))
        .await?;
    if resp.status != 200 {
        return Ok(expect::unexpected(&resp));
    }

    let data = resp.json()?;
    let missing = expect::missing(&data, &["total", "byDepartment"]);
    if !missing.is_empty() {
        return Ok(Verdict::fail(format!("Missing fields: {missing:?}")));
    }

    let departments = data
        .get("byDepartment")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    Ok(Verdict::pass(format!(
        "{} DVF sales across {} departments",
        expect::show(data.get("total")),
        departments
    )))
}

use std::time::Duration;

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use protocol::{
    CaseDetails, CaseStatus, CaseSummary, EncryptedBlob, FollowupLoginRequest, FollowupSession,
    HealthResponse, InvestigatorLoginRequest, InvestigatorLoginResponse, PostMessageRequest,
    PublicKeyResponse, SubmitReportRequest, SubmitReportResponse, ThreadItemView,
    WhistleblowerCaseView, AES_GCM_NONCE_LEN,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct SmokeConfig {
    http_base: String,
    username: Option<String>,
    password: Option<String>,
    timeout_ms: u64,
}

impl SmokeConfig {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_base.trim_end_matches('/'), path)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = parse_args()?;

    println!("[smoke-client] HTTP base: {}", cfg.http_base);

    let client = Client::builder()
        .timeout(Duration::from_millis(cfg.timeout_ms))
        .build()
        .context("failed to build HTTP client")?;

    let health: HealthResponse = expect_json(
        client.get(cfg.url("/health")),
        StatusCode::OK,
        "/health",
    )
    .await?;
    println!(
        "[smoke-client] health: status={} database={} sessions={}",
        health.status, health.database, health.active_sessions
    );

    let key: PublicKeyResponse = expect_json(
        client.get(cfg.url("/api/public-key")),
        StatusCode::OK,
        "/api/public-key",
    )
    .await?;
    if !key.investigator_public_key_pem.contains("PUBLIC KEY") {
        bail!("/api/public-key did not return a PEM public key");
    }

    let case_id = run_whistleblower_flow(&client, &cfg).await?;

    match (cfg.username.as_deref(), cfg.password.as_deref()) {
        (Some(username), Some(password)) => {
            run_investigator_flow(&client, &cfg, username, password, &case_id).await?
        }
        _ => println!("[smoke-client] no investigator credentials, skipping dashboard flow"),
    }

    println!("[smoke-client] all checks passed");
    Ok(())
}

/// Placeholder ciphertext; the server never looks inside.
fn opaque_blob(label: &str) -> EncryptedBlob {
    let nonce = Uuid::new_v4().into_bytes();
    EncryptedBlob::aes_gcm(
        STANDARD.encode(format!("smoke:{}:{}", label, Uuid::new_v4())),
        STANDARD.encode(&nonce[..AES_GCM_NONCE_LEN]),
    )
}

async fn run_whistleblower_flow(client: &Client, cfg: &SmokeConfig) -> anyhow::Result<String> {
    let passphrase = format!("smoke-{}", Uuid::new_v4().simple());

    let submitted: SubmitReportResponse = expect_json(
        client.post(cfg.url("/api/submit")).json(&SubmitReportRequest {
            passphrase: passphrase.clone(),
            encrypted_case_key: STANDARD.encode(Uuid::new_v4().as_bytes()),
            report: opaque_blob("report"),
        }),
        StatusCode::CREATED,
        "/api/submit",
    )
    .await?;
    println!("[smoke-client] submitted case {}", submitted.case_id);

    let wrong = client
        .post(cfg.url("/api/followup/login"))
        .json(&FollowupLoginRequest {
            session_id: submitted.session_id.clone(),
            passphrase: "not-the-passphrase".to_string(),
        })
        .send()
        .await
        .context("network error calling /api/followup/login")?;
    if wrong.status() != StatusCode::UNAUTHORIZED {
        bail!("wrong passphrase returned {} instead of 401", wrong.status());
    }

    let session: FollowupSession = expect_json(
        client.post(cfg.url("/api/followup/login")).json(&FollowupLoginRequest {
            session_id: submitted.session_id.clone(),
            passphrase,
        }),
        StatusCode::OK,
        "/api/followup/login",
    )
    .await?;

    let followup_path = format!("/api/followup/{}", submitted.session_id);

    let _: ThreadItemView = expect_json(
        client
            .post(cfg.url(&format!("{}/reply", followup_path)))
            .bearer_auth(&session.token)
            .json(&PostMessageRequest::message(opaque_blob("followup"))),
        StatusCode::CREATED,
        "follow-up reply",
    )
    .await?;

    let view: WhistleblowerCaseView = expect_json(
        client
            .get(cfg.url(&format!("{}/thread", followup_path)))
            .bearer_auth(&session.token),
        StatusCode::OK,
        "follow-up thread",
    )
    .await?;
    if view.thread.len() != 2 {
        bail!("expected 2 thread items, found {}", view.thread.len());
    }
    println!("[smoke-client] whistleblower flow OK ({} thread items)", view.thread.len());

    Ok(submitted.case_id)
}

async fn run_investigator_flow(
    client: &Client,
    cfg: &SmokeConfig,
    username: &str,
    password: &str,
    case_id: &str,
) -> anyhow::Result<()> {
    let login: InvestigatorLoginResponse = expect_json(
        client.post(cfg.url("/api/auth/login")).json(&InvestigatorLoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }),
        StatusCode::OK,
        "/api/auth/login",
    )
    .await?;
    println!("[smoke-client] logged in as {}", login.name);

    let cases: Vec<CaseSummary> = expect_json(
        client
            .get(cfg.url("/api/investigator/cases"))
            .bearer_auth(&login.token),
        StatusCode::OK,
        "case list",
    )
    .await?;
    if !cases.iter().any(|case| case.id == case_id) {
        bail!("submitted case {} missing from the case list", case_id);
    }

    let case_path = format!("/api/investigator/cases/{}", case_id);

    let details: CaseDetails = expect_json(
        client.get(cfg.url(&case_path)).bearer_auth(&login.token),
        StatusCode::OK,
        "case details",
    )
    .await?;
    println!(
        "[smoke-client] case {} has {} thread items",
        details.summary.id,
        details.thread.len()
    );

    let summary: CaseSummary = expect_json(
        client
            .put(cfg.url(&format!("{}/status", case_path)))
            .query(&[("newStatus", CaseStatus::InReview.as_str())])
            .bearer_auth(&login.token),
        StatusCode::OK,
        "status update",
    )
    .await?;
    if summary.status != CaseStatus::InReview {
        bail!("status update returned {:?}", summary.status);
    }

    let _: ThreadItemView = expect_json(
        client
            .post(cfg.url(&format!("{}/reply", case_path)))
            .bearer_auth(&login.token)
            .json(&PostMessageRequest::message(opaque_blob("investigator"))),
        StatusCode::CREATED,
        "investigator reply",
    )
    .await?;

    let logout = client
        .post(cfg.url("/api/auth/logout"))
        .bearer_auth(&login.token)
        .send()
        .await
        .context("network error calling /api/auth/logout")?;
    if logout.status() != StatusCode::OK {
        bail!("/api/auth/logout failed with status {}", logout.status());
    }

    println!("[smoke-client] investigator flow OK");
    Ok(())
}

async fn expect_json<T: DeserializeOwned>(
    request: RequestBuilder,
    expected: StatusCode,
    label: &str,
) -> anyhow::Result<T> {
    let response = request
        .send()
        .await
        .with_context(|| format!("network error calling {}", label))?;

    if response.status() != expected {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        bail!("{} failed with status {}: {}", label, status, body);
    }

    response
        .json()
        .await
        .with_context(|| format!("failed to decode response of {}", label))
}

fn parse_args() -> anyhow::Result<SmokeConfig> {
    let mut cfg = SmokeConfig {
        http_base: "http://127.0.0.1:8080".to_string(),
        username: None,
        password: None,
        timeout_ms: 5_000,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--http-base" => cfg.http_base = next_arg_value(&mut args, &arg)?,
            "--username" => cfg.username = Some(next_arg_value(&mut args, &arg)?),
            "--password" => cfg.password = Some(next_arg_value(&mut args, &arg)?),
            "--timeout-ms" => {
                let value = next_arg_value(&mut args, &arg)?;
                cfg.timeout_ms = value
                    .parse::<u64>()
                    .with_context(|| format!("invalid --timeout-ms: {}", value))?;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => bail!("unknown argument: {}\nUse --help to list options.", other),
        }
    }

    if cfg.username.is_some() != cfg.password.is_some() {
        bail!("--username and --password must be given together");
    }

    Ok(cfg)
}

fn next_arg_value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next()
        .with_context(|| format!("missing value for {}", flag))
}

fn print_help() {
    println!(
        "smoke-client: end-to-end check against a running server\n\n\
         Usage: smoke-client [--http-base <url>] [--username <name> --password <pw>]\n\n\
         Options:\n  \
           --http-base <url>   server base URL (default: http://127.0.0.1:8080)\n  \
           --username <name>   investigator login; enables the dashboard checks\n  \
           --password <pw>     investigator password\n  \
           --timeout-ms <ms>   per-request timeout (default: 5000)"
    );
}

//! # CLI and HTTP Service Share One Registry File
//!
//! A registry file written by the operator CLI is served by the HTTP
//! service, and mutations made over HTTP are visible to the CLI afterwards.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use credreg_api::state::{AppConfig, AppState, TokenBinding};
use credreg_cli::credential::{run_credential, CredentialArgs, CredentialCommand, CredentialRef};
use credreg_cli::ledger_file::LedgerFile;
use credreg_cli::registry::{run_init, InitArgs};
use credreg_cli::seed::{run_seed, SAMPLES};
use credreg_cli::CliContext;
use credreg_core::{category_tag, credential_key, Identity};

const ADMIN: Identity = Identity::from_bytes([0xAD; 20]);
const ACME: Identity = Identity::from_bytes([0x0A; 20]);
const ADMIN_TOKEN: &str = "admin-token";
const ACME_TOKEN: &str = "acme-token";

fn cli(dir: &tempfile::TempDir) -> CliContext {
    CliContext {
        ledger: dir.path().join("registry.json"),
        caller: Some(ADMIN),
    }
}

fn service(ctx: &CliContext) -> axum::Router {
    let config = AppConfig {
        snapshot_path: Some(ctx.ledger.clone()),
        tokens: vec![
            TokenBinding {
                token: ADMIN_TOKEN.into(),
                identity: ADMIN,
            },
            TokenBinding {
                token: ACME_TOKEN.into(),
                identity: ACME,
            },
        ],
        ..AppConfig::default()
    };
    credreg_api::app(AppState::bootstrap(config).unwrap())
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn service_verifies_credentials_seeded_by_cli() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = cli(&dir);
    run_init(&InitArgs { admin: ADMIN }, &ctx).unwrap();
    run_seed(&ctx).unwrap();

    let app = service(&ctx);
    for (name, content, category) in SAMPLES {
        let uri = format!(
            "/v1/credentials/{}/verify?issuer_name={}",
            credential_key(content),
            name.replace(' ', "%20")
        );
        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], true, "{name}");
        assert_eq!(body["category"], json!(category_tag(category)));
    }

    let (status, body) = send(&app, get("/v1/registry")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials_issued"], 3);
}

#[tokio::test]
async fn cli_sees_mutations_made_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = cli(&dir);
    run_init(&InitArgs { admin: ADMIN }, &ctx).unwrap();

    let app = service(&ctx);
    let (status, _) = send(
        &app,
        post(
            "/v1/issuers/authorize",
            ADMIN_TOKEN,
            json!({"name": "Acme", "identity": ACME}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        post(
            "/v1/credentials/issue",
            ACME_TOKEN,
            json!({
                "credential_key": credential_key("cert-1"),
                "issuer_name": "Acme",
                "category": category_tag("BACHELOR"),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // The CLI picks up the persisted state and can act on it.
    let file = LedgerFile::open(&ctx.ledger).unwrap();
    assert!(file
        .ledger()
        .verify_credential(&credential_key("cert-1"), "Acme")
        .is_valid);
    drop(file);

    let revoke = CredentialArgs {
        command: CredentialCommand::Revoke {
            issuer: "Acme".into(),
            credential: CredentialRef {
                content: Some("cert-1".into()),
                key: None,
            },
        },
    };
    let acme = CliContext {
        caller: Some(ACME),
        ..ctx.clone()
    };
    assert_eq!(run_credential(&revoke, &acme).unwrap(), 0);

    let reopened = LedgerFile::open(&ctx.ledger).unwrap();
    let summary = reopened.ledger().summary();
    assert_eq!(summary.credentials_revoked, 1);
    assert_eq!(summary.journal_length, 3);
}

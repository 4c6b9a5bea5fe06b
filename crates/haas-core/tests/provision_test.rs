#![allow(clippy::unwrap_used)]
// End-to-end provisioning against a wiremock Superset.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use haas_core::{
    ChartSpec, CoreError, DashboardSpec, DatasetSpec, Outcome, ProvisionConfig, RemoteId,
    ResourceKind, SpecSet, SupersetResources, provision,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> ProvisionConfig {
    ProvisionConfig {
        url: Url::parse(&server.uri()).unwrap(),
        dataset_spacing: Duration::ZERO,
        ..ProvisionConfig::default()
    }
}

fn filter_q(col: &str, value: &str) -> String {
    json!({ "filters": [{ "col": col, "opr": "eq", "value": value }] }).to_string()
}

fn single_chain() -> SpecSet {
    SpecSet::builder()
        .dataset(DatasetSpec::new("Temp", "SELECT 1"))
        .chart(ChartSpec::new("C1", "Temp", "table", json!({ "row_limit": 100 })))
        .dashboard(DashboardSpec::new("H1", "h1", ["C1"]))
        .build()
        .unwrap()
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/security/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "jwt-token" })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/security/csrf_token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "csrf-123" })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logout/"))
        .respond_with(ResponseTemplate::new(302))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_database(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/database/"))
        .and(query_param("q", filter_q("database_name", "Home Assistant")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": rows })))
        .mount(server)
        .await;
}

async fn mount_find(
    server: &MockServer,
    resource: &str,
    col: &str,
    value: &str,
    rows: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/{resource}/")))
        .and(query_param("q", filter_q(col, value)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": rows })))
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_provision_creates_chain_on_empty_server() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_database(&server, json!([{ "id": 1 }])).await;
    mount_find(&server, "dataset", "table_name", "Temp", json!([])).await;
    mount_find(&server, "chart", "slice_name", "C1", json!([])).await;
    mount_find(&server, "dashboard", "dashboard_title", "H1", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dataset/"))
        .and(body_json(json!({ "database": 1, "table_name": "Temp", "sql": "SELECT 1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 101 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chart/"))
        .and(body_partial_json(json!({
            "slice_name": "C1",
            "datasource_id": 101,
            "datasource_type": "table",
            "params": "{\"row_limit\":100}",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 201 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard/"))
        .and(body_partial_json(json!({ "dashboard_title": "H1", "slug": "h1", "published": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 301 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard/301/charts"))
        .and(body_json(json!({ "chart_id": 201 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let report = provision(&config(&server), &single_chain()).await.unwrap();

    let ids: Vec<_> = report.entries.iter().map(|e| e.resolved_id).collect();
    assert_eq!(ids, vec![Some(RemoteId(101)), Some(RemoteId(201)), Some(RemoteId(301))]);
    assert!(report.entries.iter().all(|e| e.outcome == Outcome::Created));
}

#[tokio::test]
async fn test_provision_reuses_existing_resources() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_database(&server, json!([{ "id": 1 }])).await;
    mount_find(&server, "dataset", "table_name", "Temp", json!([{ "id": 5 }])).await;
    mount_find(&server, "chart", "slice_name", "C1", json!([{ "id": 6 }])).await;
    mount_find(&server, "dashboard", "dashboard_title", "H1", json!([{ "id": 7 }])).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dataset/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 999 })))
        .expect(0)
        .mount(&server)
        .await;

    let report = provision(&config(&server), &single_chain()).await.unwrap();

    assert!(report.entries.iter().all(|e| e.outcome == Outcome::Reused));
    assert_eq!(report.resolved_id(ResourceKind::Dashboard, "H1"), Some(RemoteId(7)));
}

#[tokio::test]
async fn test_provision_rejected_dataset_is_reported() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_database(&server, json!([{ "id": 1 }])).await;
    mount_find(&server, "dataset", "table_name", "Temp", json!([])).await;
    mount_find(&server, "chart", "slice_name", "C1", json!([])).await;
    mount_find(&server, "dashboard", "dashboard_title", "H1", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dataset/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": { "table_name": ["Dataset already exists"] }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard/"))
        .and(body_partial_json(json!({ "dashboard_title": "H1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 301 })))
        .expect(1)
        .mount(&server)
        .await;

    let report = provision(&config(&server), &single_chain()).await.unwrap();

    let labels: Vec<_> = report.entries.iter().map(|e| e.outcome.label()).collect();
    assert_eq!(labels, vec!["failed", "skipped", "created"]);
    assert!(report.is_degraded());
}

#[tokio::test]
async fn test_provision_requires_database() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_database(&server, json!([])).await;

    let result = provision(&config(&server), &single_chain()).await;

    match result {
        Err(CoreError::DatabaseNotFound { ref name }) => assert_eq!(name, "Home Assistant"),
        other => panic!("expected DatabaseNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_provision_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/security/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Not authorized" })),
        )
        .mount(&server)
        .await;

    let result = provision(&config(&server), &single_chain()).await;

    assert!(
        matches!(result, Err(CoreError::AuthenticationFailed { .. })),
        "expected AuthenticationFailed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_session_debug_omits_tokens() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let session = SupersetResources::connect(&config(&server)).await.unwrap();
    let shown = format!("{session:?}");
    assert!(shown.contains("authenticated: true"));
    assert!(!shown.contains("jwt-token"));

    session.release().await;
}

#![allow(clippy::unwrap_used)]
// Integration tests for `SupersetClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use haas_api::{Error, NewChart, NewDashboard, NewDataset, SupersetClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SupersetClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = SupersetClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn filter_q(col: &str, value: &str) -> String {
    json!({ "filters": [{ "col": col, "opr": "eq", "value": value }] }).to_string()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/security/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "jwt-token" })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/security/csrf_token/"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "csrf-123" })))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_sets_bearer_and_csrf() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dataset/"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(header("x-csrftoken", "csrf-123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "admin".to_string().into();
    client.login("admin", &secret).await.unwrap();
    assert!(client.is_authenticated());

    let id = client
        .create_dataset(&NewDataset {
            database: 1,
            table_name: "Temperature History",
            sql: "SELECT 1",
            schema: None,
        })
        .await
        .unwrap();
    assert_eq!(id, 7);
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/security/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Not authorized" })),
        )
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("admin", &secret).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(
                message.contains("Not authorized"),
                "expected server message, got: {message}"
            );
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/logout/"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "admin".to_string().into();
    client.login("admin", &secret).await.unwrap();
    client.logout().await.unwrap();
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_debug_hides_session_tokens() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    let secret: secrecy::SecretString = "admin".to_string().into();
    client.login("admin", &secret).await.unwrap();

    let shown = format!("{client:?}");
    assert!(shown.contains(&server.uri()));
    assert!(shown.contains("authenticated: true"));
    assert!(!shown.contains("jwt-token"));
    assert!(!shown.contains("csrf-123"));
}

// ── Lookup tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_dataset_hit() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/"))
        .and(query_param("q", filter_q("table_name", "Temperature History")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "result": [{ "id": 42, "table_name": "Temperature History" }]
        })))
        .mount(&server)
        .await;

    let id = client.find_dataset("Temperature History").await.unwrap();
    assert_eq!(id, Some(42));
}

#[tokio::test]
async fn test_find_chart_miss() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chart/"))
        .and(query_param("q", filter_q("slice_name", "Humidity Timeline")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "result": [] })),
        )
        .mount(&server)
        .await;

    let id = client.find_chart("Humidity Timeline").await.unwrap();
    assert_eq!(id, None);
}

#[tokio::test]
async fn test_find_dashboard_and_database() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/"))
        .and(query_param("q", filter_q("dashboard_title", "Home Overview")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "result": [{ "id": 3 }, { "id": 8 }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/database/"))
        .and(query_param("q", filter_q("database_name", "Home Assistant")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "result": [{ "id": 1, "database_name": "Home Assistant" }]
        })))
        .mount(&server)
        .await;

    assert_eq!(client.find_dashboard("Home Overview").await.unwrap(), Some(3));
    assert_eq!(client.find_database("Home Assistant").await.unwrap(), Some(1));
}

// ── Create tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_chart_sends_params_as_string() {
    let (server, client) = setup().await;

    let params = json!({ "x_axis": "time", "metrics": ["temperature"] });

    Mock::given(method("POST"))
        .and(path("/api/v1/chart/"))
        .and(body_json(json!({
            "slice_name": "Temperature Timeline",
            "datasource_id": 101,
            "datasource_type": "table",
            "viz_type": "echarts_timeseries_line",
            "params": params.to_string(),
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 201, "result": {} })),
        )
        .mount(&server)
        .await;

    let id = client
        .create_chart(&NewChart {
            slice_name: "Temperature Timeline",
            datasource_id: 101,
            datasource_type: "table",
            viz_type: "echarts_timeseries_line",
            params: params.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(id, 201);
}

#[tokio::test]
async fn test_create_dashboard_and_attach() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 301 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dashboard/301/charts"))
        .and(body_json(json!({ "chart_id": 201 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let id = client
        .create_dashboard(&NewDashboard {
            dashboard_title: "Home Overview",
            slug: Some("home-overview"),
            published: true,
            position_json: None,
        })
        .await
        .unwrap();
    assert_eq!(id, 301);

    client.add_dashboard_chart(301, 201).await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_error_is_rejection() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/dataset/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": { "table_name": ["Dataset Temperature History already exists"] }
        })))
        .mount(&server)
        .await;

    let err = client
        .create_dataset(&NewDataset {
            database: 1,
            table_name: "Temperature History",
            sql: "SELECT 1",
            schema: None,
        })
        .await
        .unwrap_err();

    assert!(err.is_rejection(), "expected rejection, got: {err:?}");
    assert!(!err.is_transient());
    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chart/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client.find_chart("System Metrics").await.unwrap_err();
    match err {
        Error::Api {
            status,
            ref message,
        } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        ref other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "msg": "Token has expired" })),
        )
        .mount(&server)
        .await;

    let err = client.find_dataset("Entity Domains").await.unwrap_err();
    match err {
        Error::Authentication { ref message } => assert_eq!(message, "Token has expired"),
        ref other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client.find_dataset("Climate States").await.unwrap_err();
    assert!(
        matches!(err, Error::Deserialization { ref body, .. } if body.contains("<html>")),
        "expected Deserialization error, got: {err:?}"
    );
}

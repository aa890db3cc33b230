//! HTTP binding integration tests
//!
//! The router is exercised in-process with `tower::ServiceExt::oneshot`, one
//! fresh request per test, against a mocked Canvas upstream. The gate tests
//! use mock hit counts to prove rejected requests never reach Canvas.
//!
//! Run with: cargo test --test http_tests

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use canvas_mcp::auth::AccessGate;
use canvas_mcp::canvas::CanvasClient;
use canvas_mcp::config::Config;
use canvas_mcp::http::{router, AppState};
use canvas_mcp::tools::catalog::build_registry;
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

const GATE_TOKEN: &str = "test-gate-token";

fn app_with_gate(server: &MockServer, gate: AccessGate) -> Router {
    let config = Config {
        canvas_api_key: "test-canvas-key".to_string(),
        canvas_base_url: server.base_url(),
        ..Default::default()
    };
    let state = AppState::new(
        Arc::new(build_registry().unwrap()),
        Arc::new(CanvasClient::new(&config)),
        gate,
    );
    router(state)
}

fn app_for(server: &MockServer) -> Router {
    app_with_gate(server, AccessGate::new(Some(GATE_TOKEN)))
}

fn rpc_request(token: Option<&str>, payload: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_needs_no_credential() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "canvas-mcp");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_lists_catalog_metadata() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "canvas-mcp");
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 12);
    assert_eq!(tools[0], "list_courses");
    assert!(body["endpoints"]["mcp"].is_string());
}

#[tokio::test]
async fn test_missing_credential_is_401_and_never_reaches_canvas() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.path_contains("/api/v1");
            then.status(200).json_body(json!([]));
        })
        .await;
    let app = app_for(&server);

    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": "list_courses", "arguments": {}}
    });
    let response = app.oneshot(rpc_request(None, &payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(upstream.hits_async().await, 0);
}

#[tokio::test]
async fn test_missing_and_wrong_credentials_are_distinct_rejections() {
    let server = MockServer::start_async().await;
    let payload = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"});

    let missing = app_for(&server)
        .oneshot(rpc_request(None, &payload))
        .await
        .unwrap();
    let wrong = app_for(&server)
        .oneshot(rpc_request(Some("not-the-token"), &payload))
        .await
        .unwrap();

    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let missing = body_json(missing).await;
    let wrong = body_json(wrong).await;
    assert_ne!(missing["message"], wrong["message"]);
    // Neither body echoes the credential the client presented.
    assert!(!wrong.to_string().contains("not-the-token"));
}

#[tokio::test]
async fn test_unconfigured_gate_fails_closed_with_500() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.path_contains("/api/v1");
            then.status(200).json_body(json!([]));
        })
        .await;
    let app = app_with_gate(&server, AccessGate::new(None));

    let payload = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"});
    let response = app
        .oneshot(rpc_request(Some(GATE_TOKEN), &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Server misconfigured");
    assert_eq!(upstream.hits_async().await, 0);
}

#[tokio::test]
async fn test_tool_call_round_trip() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/courses");
            then.status(200)
                .json_body(json!([{"id": 7, "name": "Linear Algebra"}]));
        })
        .await;
    let app = app_for(&server);

    let payload = json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {"name": "list_courses", "arguments": {}}
    });
    let response = app
        .oneshot(rpc_request(Some(GATE_TOKEN), &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 3);
    let result = &body["result"];
    assert!(result.get("isError").is_none());
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Linear Algebra"));
}

#[tokio::test]
async fn test_tools_list_over_http() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let payload = json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"});
    let response = app
        .oneshot(rpc_request(Some(GATE_TOKEN), &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 12);
    assert_eq!(tools[0]["name"], "list_courses");
    assert!(tools[0]["inputSchema"]["type"] == "object");
}

#[tokio::test]
async fn test_concurrent_calls_see_only_their_own_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/courses/1001/assignments");
            then.status(200)
                .json_body(json!([{"id": 1, "name": "Essay for course 1001"}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/courses/2002/assignments");
            then.status(200)
                .json_body(json!([{"id": 2, "name": "Lab for course 2002"}]));
        })
        .await;
    let app = app_for(&server);

    let call = |course_id: i64| {
        rpc_request(
            Some(GATE_TOKEN),
            &json!({
                "jsonrpc": "2.0",
                "id": course_id,
                "method": "tools/call",
                "params": {"name": "get_assignments", "arguments": {"course_id": course_id}}
            }),
        )
    };

    let (first, second) = tokio::join!(
        app.clone().oneshot(call(1001)),
        app.clone().oneshot(call(2002)),
    );

    let first = body_json(first.unwrap()).await;
    let second = body_json(second.unwrap()).await;

    assert_eq!(first["id"], 1001);
    let first_text = first["result"]["content"][0]["text"].as_str().unwrap();
    assert!(first_text.contains("Essay for course 1001"));
    assert!(!first_text.contains("course 2002"));

    assert_eq!(second["id"], 2002);
    let second_text = second["result"]["content"][0]["text"].as_str().unwrap();
    assert!(second_text.contains("Lab for course 2002"));
    assert!(!second_text.contains("course 1001"));
}

#[tokio::test]
async fn test_malformed_body_is_a_framing_error() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header(header::AUTHORIZATION, format!("Bearer {GATE_TOKEN}"))
        .body(Body::from("{not json at all"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["error"]["code"], -32603);
}

#[tokio::test]
async fn test_unknown_method_is_an_rpc_error_not_an_http_error() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let payload = json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"});
    let response = app
        .oneshot(rpc_request(Some(GATE_TOKEN), &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32601);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("resources/list"));
}

#[tokio::test]
async fn test_notification_returns_202_with_empty_body() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let payload = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let response = app
        .oneshot(rpc_request(Some(GATE_TOKEN), &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_get_mcp_returns_capability_envelope() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/mcp")
        .header(header::AUTHORIZATION, format!("Bearer {GATE_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(body["result"]["serverInfo"]["name"], "canvas-mcp");

    // The gate covers GET just as it covers POST.
    let unauthenticated = Request::builder()
        .method(Method::GET)
        .uri("/mcp")
        .body(Body::empty())
        .unwrap();
    let denied = app.oneshot(unauthenticated).await.unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_mcp_is_a_stateless_noop() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let teardown = || {
        Request::builder()
            .method(Method::DELETE)
            .uri("/mcp")
            .header(header::AUTHORIZATION, format!("Bearer {GATE_TOKEN}"))
            .body(Body::empty())
            .unwrap()
    };

    // There is no session, so tearing one down twice works the same way.
    for _ in 0..2 {
        let response = app.clone().oneshot(teardown()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["result"], json!({}));
    }
}

#[tokio::test]
async fn test_unknown_path_is_404_with_guidance() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not found");
    assert!(body["message"].as_str().unwrap().contains("/mcp"));
}

#[tokio::test]
async fn test_cors_preflight_is_answered() {
    let server = MockServer::start_async().await;
    let app = app_for(&server);

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/mcp")
        .header(header::ORIGIN, "https://client.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            "authorization,content-type",
        )
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(preflight).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

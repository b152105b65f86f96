//! Health endpoint integration tests.

use axum::http::StatusCode;
use bizhub_core::types::UserId;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let res = app.request("GET", "/api/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_reports_connections() {
    let app = TestApp::new();
    let user = UserId::new();
    let _first = app.open_stream(user).await;
    let _second = app.open_stream(user).await;

    let res = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["connections"], 2);
    assert_eq!(res.body["data"]["online_users"], 1);
    assert_eq!(res.body["data"]["active_calls"], 0);
}

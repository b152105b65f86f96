//! Event stream lifecycle and presence integration tests.

use axum::http::StatusCode;
use bizhub_core::types::UserId;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_stream_requires_authentication() {
    let app = TestApp::new();

    let missing = app.open_stream_at("/api/events/stream", None).await;
    assert_eq!(missing.err(), Some(StatusCode::UNAUTHORIZED));

    let forged = app
        .open_stream_at("/api/events/stream", Some("not-a-token"))
        .await;
    assert_eq!(forged.err(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_stream_accepts_query_token() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token_for(user);

    let mut stream = app
        .open_stream_at(&format!("/api/events/stream?token={token}"), None)
        .await
        .expect("Query token should authenticate");

    let first = stream.next_event().await.expect("connected frame");
    assert_eq!(first["type"], "connected");
    assert_eq!(first["userId"], user.to_string());
}

#[tokio::test]
async fn test_connected_first_then_online_broadcast() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();

    let mut alice_stream = app.open_stream(alice).await;
    let first = alice_stream.next_event().await.expect("connected frame");
    assert_eq!(first["type"], "connected");
    assert!(first["timestamp"].is_string());

    let mut bob_stream = app.open_stream(bob).await;
    let first = bob_stream.next_event().await.expect("connected frame");
    assert_eq!(first["type"], "connected", "connected must precede presence");

    let own = alice_stream.next_of_type("user_status").await;
    assert_eq!(own["userId"], alice.to_string());

    let status = alice_stream.next_status_for(bob).await;
    assert_eq!(status["status"], "online");
    let online = status["onlineUsers"].as_array().expect("onlineUsers");
    assert!(online.contains(&bob.to_string().into()));
    assert!(online.contains(&alice.to_string().into()));
}

#[tokio::test]
async fn test_second_tab_does_not_rebroadcast_online() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();

    let mut alice_stream = app.open_stream(alice).await;
    alice_stream.next_of_type("connected").await;

    let _bob_first = app.open_stream(bob).await;
    alice_stream.next_status_for(bob).await;

    let _bob_second = app.open_stream(bob).await;
    alice_stream.assert_no_event_of_type("user_status").await;
    assert_eq!(app.state.realtime.connections.connection_count(), 3);
}

#[tokio::test]
async fn test_dropped_stream_goes_offline() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let token = app.token_for(alice);

    let mut alice_stream = app.open_stream(alice).await;
    alice_stream.next_of_type("connected").await;

    let bob_stream = app.open_stream(bob).await;
    let online = alice_stream.next_status_for(bob).await;
    assert_eq!(online["status"], "online");

    drop(bob_stream);

    let status = alice_stream.next_status_for(bob).await;
    assert_eq!(status["status"], "offline");
    assert!(status["lastSeen"].is_string());

    let res = app
        .request("GET", &format!("/api/presence/{bob}"), None, Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["status"], "offline");
    assert_eq!(res.body["data"]["connections"], 0);
    assert!(res.body["data"]["lastSeen"].is_string());
}

#[tokio::test]
async fn test_online_users_endpoint() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let token = app.token_for(alice);

    let _a = app.open_stream(alice).await;
    let _b1 = app.open_stream(bob).await;
    let _b2 = app.open_stream(bob).await;

    let res = app
        .request("GET", "/api/presence/online", None, Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["count"], 2);

    let res = app
        .request("GET", &format!("/api/presence/{bob}"), None, Some(&token))
        .await;
    assert_eq!(res.body["data"]["status"], "online");
    assert_eq!(res.body["data"]["connections"], 2);
}

#[tokio::test]
async fn test_presence_endpoints_require_authentication() {
    let app = TestApp::new();

    let res = app.request("GET", "/api/presence/online", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "UNAUTHORIZED");
}

//! Event submission and relay integration tests.

use axum::http::StatusCode;
use bizhub_core::config::AppConfig;
use bizhub_core::types::UserId;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_relay_reaches_only_the_receiver() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let carol = UserId::new();

    let _alice_stream = app.open_stream(alice).await;
    let mut bob_stream = app.open_stream(bob).await;
    let mut carol_stream = app.open_stream(carol).await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({
                "type": "typing",
                "receiverId": bob,
                "isTyping": true,
                "senderId": carol,
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["type"], "typing");

    let event = bob_stream.next_of_type("typing").await;
    assert_eq!(event["senderId"], alice.to_string(), "sender is stamped by the server");
    assert_eq!(event["receiverId"], bob.to_string());
    assert_eq!(event["isTyping"], true);
    assert!(event["timestamp"].is_string());

    carol_stream.assert_no_event_of_type("typing").await;
}

#[tokio::test]
async fn test_relay_fans_out_to_every_tab() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();

    let mut tab_one = app.open_stream(bob).await;
    let mut tab_two = app.open_stream(bob).await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "relay", "receiverId": bob, "note": "hello" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    assert_eq!(tab_one.next_of_type("relay").await["note"], "hello");
    assert_eq!(tab_two.next_of_type("relay").await["note"], "hello");
}

#[tokio::test]
async fn test_hyphenated_type_is_accepted() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let mut bob_stream = app.open_stream(bob).await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "new-message", "receiverId": bob, "content": "hi" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["type"], "new_message");

    let event = bob_stream.next_of_type("new_message").await;
    assert_eq!(event["content"], "hi");
}

#[tokio::test]
async fn test_offline_receiver_is_accepted() {
    let app = TestApp::new();
    let alice = UserId::new();

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "typing", "receiverId": UserId::new() }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
}

#[tokio::test]
async fn test_missing_receiver_is_rejected() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let res = app.submit(&token, json!({ "type": "typing" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_events_are_rejected() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let res = app
        .raw_request("POST", "/api/events", b"{not json".to_vec(), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .submit(&token, json!({ "type": "teleport", "receiverId": UserId::new() }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.submit(&token, json!(["typing"])).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_event_is_rejected() {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.realtime.max_event_size_bytes = 128;
    let app = TestApp::with_config(config);
    let token = app.token_for(UserId::new());

    let res = app
        .submit(
            &token,
            json!({ "type": "relay", "receiverId": UserId::new(), "blob": "x".repeat(512) }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_requires_authentication() {
    let app = TestApp::new();

    let res = app
        .request(
            "POST",
            "/api/events",
            Some(json!({ "type": "typing", "receiverId": UserId::new() })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_connected_cannot_be_sent_to_another_user() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let mut alice_stream = app.open_stream(alice).await;
    let mut bob_stream = app.open_stream(bob).await;
    alice_stream.next_of_type("connected").await;
    bob_stream.next_of_type("connected").await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "connected", "receiverId": bob }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    bob_stream.assert_no_event_of_type("connected").await;
    let echoed = alice_stream.next_of_type("connected").await;
    assert_eq!(echoed["senderId"], alice.to_string());
}

#[tokio::test]
async fn test_heartbeat_cannot_be_submitted() {
    let app = TestApp::new();
    let bob = UserId::new();
    let mut bob_stream = app.open_stream(bob).await;

    let res = app
        .submit(
            &app.token_for(UserId::new()),
            json!({ "type": "heartbeat", "receiverId": bob }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    bob_stream.assert_no_event_of_type("heartbeat").await;
}

//! Chat messaging integration tests.

use axum::http::StatusCode;
use bizhub_core::types::UserId;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_message_to_online_user_is_delivered() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let mut bob_stream = app.open_stream(bob).await;

    let res = app
        .request(
            "POST",
            "/api/messages",
            Some(json!({ "receiverId": bob, "content": "  lunch?  " })),
            Some(&app.token_for(alice)),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["content"], "lunch?");
    assert_eq!(res.body["data"]["status"], "delivered");

    let event = bob_stream.next_of_type("new_message").await;
    assert_eq!(event["messageId"], res.body["data"]["id"]);
    assert_eq!(event["senderId"], alice.to_string());
}

#[tokio::test]
async fn test_message_to_offline_user_is_stored() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let alice_token = app.token_for(alice);

    let res = app
        .request(
            "POST",
            "/api/messages",
            Some(json!({ "receiverId": bob, "content": "ping" })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["status"], "sent");

    let res = app
        .request(
            "GET",
            &format!("/api/messages/{alice}"),
            None,
            Some(&app.token_for(bob)),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let history = res.body["data"].as_array().expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["content"], "ping");
}

#[tokio::test]
async fn test_history_limit() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let token = app.token_for(alice);

    for i in 0..5 {
        app.request(
            "POST",
            "/api/messages",
            Some(json!({ "receiverId": bob, "content": format!("msg {i}") })),
            Some(&token),
        )
        .await;
    }

    let res = app
        .request("GET", &format!("/api/messages/{bob}?limit=2"), None, Some(&token))
        .await;
    assert_eq!(res.body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_invalid_messages_are_rejected() {
    let app = TestApp::new();
    let alice = UserId::new();
    let token = app.token_for(alice);

    let res = app
        .request(
            "POST",
            "/api/messages",
            Some(json!({ "receiverId": UserId::new(), "content": "   " })),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .request(
            "POST",
            "/api/messages",
            Some(json!({ "receiverId": alice, "content": "note to self" })),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

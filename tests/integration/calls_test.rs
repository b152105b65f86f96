//! Call signaling integration tests.

use axum::http::StatusCode;
use bizhub_core::types::UserId;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_call_lifecycle() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let alice_token = app.token_for(alice);
    let bob_token = app.token_for(bob);

    let mut alice_stream = app.open_stream(alice).await;
    let mut bob_stream = app.open_stream(bob).await;

    let res = app
        .submit(
            &alice_token,
            json!({ "type": "call_initiate", "receiverId": bob, "callType": "video" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["call"]["status"], "ringing");
    let call_id = res.body["data"]["callId"]
        .as_str()
        .expect("callId")
        .to_string();

    let offer = bob_stream.next_of_type("call_initiate").await;
    assert_eq!(offer["callId"], call_id);
    assert_eq!(offer["callType"], "video");
    assert_eq!(offer["senderId"], alice.to_string());
    assert!(!offer["iceServers"].as_array().expect("iceServers").is_empty());

    let res = app
        .submit(
            &bob_token,
            json!({ "type": "call_accept", "receiverId": alice, "callId": call_id }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["call"]["status"], "connected");
    alice_stream.next_of_type("call_accept").await;

    let res = app
        .submit(
            &alice_token,
            json!({
                "type": "call_ice_candidate",
                "receiverId": bob,
                "callId": call_id,
                "candidate": "candidate:1 1 udp 2122260223 10.0.0.1 54400 typ host",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let candidate = bob_stream.next_of_type("call_ice_candidate").await;
    assert!(candidate["candidate"].as_str().is_some());

    let res = app
        .submit(
            &alice_token,
            json!({ "type": "call_end", "receiverId": bob, "callId": call_id }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["call"]["status"], "ended");
    bob_stream.next_of_type("call_end").await;

    let res = app
        .submit(
            &bob_token,
            json!({ "type": "call_accept", "receiverId": alice, "callId": call_id }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_busy_receiver_is_conflict() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let carol = UserId::new();

    let _a = app.open_stream(alice).await;
    let _b = app.open_stream(bob).await;
    let _c = app.open_stream(carol).await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "call_initiate", "receiverId": bob }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .submit(
            &app.token_for(carol),
            json!({ "type": "call_initiate", "receiverId": bob }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "CONFLICT");
    assert_eq!(app.state.realtime.calls.active_count(), 1);
}

#[tokio::test]
async fn test_calling_offline_user_is_conflict() {
    let app = TestApp::new();
    let alice = UserId::new();
    let _a = app.open_stream(alice).await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "call_initiate", "receiverId": UserId::new() }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(app.state.realtime.calls.active_count(), 0);
}

#[tokio::test]
async fn test_rejected_call_notifies_caller() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();

    let mut alice_stream = app.open_stream(alice).await;
    let _b = app.open_stream(bob).await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "call_initiate", "receiverId": bob }),
        )
        .await;
    let call_id = res.body["data"]["callId"].clone();

    let res = app
        .submit(
            &app.token_for(bob),
            json!({ "type": "call_reject", "receiverId": alice, "callId": call_id }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["call"]["status"], "rejected");

    let rejected = alice_stream.next_of_type("call_reject").await;
    assert_eq!(rejected["callId"], call_id);
    assert_eq!(app.state.realtime.calls.active_count(), 0);
}

#[tokio::test]
async fn test_disconnect_ends_call() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();

    let mut alice_stream = app.open_stream(alice).await;
    let bob_stream = app.open_stream(bob).await;

    let res = app
        .submit(
            &app.token_for(alice),
            json!({ "type": "call_initiate", "receiverId": bob }),
        )
        .await;
    let call_id = res.body["data"]["callId"].clone();

    drop(bob_stream);

    let ended = alice_stream.next_of_type("call_end").await;
    assert_eq!(ended["callId"], call_id);
    assert_eq!(ended["reason"], "disconnected");
    assert!(app.state.realtime.calls.active_call(&alice).is_none());
}

#[tokio::test]
async fn test_active_call_endpoint() {
    let app = TestApp::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let token = app.token_for(alice);

    let _a = app.open_stream(alice).await;
    let _b = app.open_stream(bob).await;

    let res = app.request("GET", "/api/calls/active", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["data"].is_null());

    app.submit(&token, json!({ "type": "call_initiate", "receiverId": bob }))
        .await;

    let res = app.request("GET", "/api/calls/active", None, Some(&token)).await;
    assert_eq!(res.body["data"]["callerId"], alice.to_string());
    assert_eq!(res.body["data"]["receiverId"], bob.to_string());
}

#[tokio::test]
async fn test_ice_servers_endpoint() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let res = app
        .request("GET", "/api/calls/ice-servers", None, Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let servers = res.body["data"]["iceServers"].as_array().expect("iceServers");
    assert!(servers.iter().any(|s| s["username"].is_string()));
    assert!(servers.iter().any(|s| s["username"].is_null()));
}

//! Shared test helpers for integration tests.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;

use bizhub_api::{AppState, build_app};
use bizhub_auth::{Identity, JwtEncoder};
use bizhub_core::config::AppConfig;
use bizhub_core::types::{CompanyId, UserId};
use bizhub_entity::user::UserRole;

/// How long to wait for an event that should arrive.
const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to watch for an event that should not arrive.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the relay directly
    pub state: AppState,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application with an isolated relay.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from an adjusted config.
    pub fn with_config(config: AppConfig) -> Self {
        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config);
        let router = build_app(state.clone());
        Self {
            router,
            state,
            encoder,
        }
    }

    /// Mint an access token for `user_id`.
    pub fn token_for(&self, user_id: UserId) -> String {
        let identity = Identity {
            user_id,
            role: UserRole::Employee,
            company_id: CompanyId::new(),
        };
        self.encoder
            .generate_access_token(&identity)
            .expect("Failed to mint token")
            .0
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body = body
            .map(|b| serde_json::to_vec(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body, token).await
    }

    /// Make an HTTP request with a raw body.
    pub async fn raw_request(
        &self,
        method: &str,
        path: &str,
        body: Vec<u8>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Submit an event as `token`'s user.
    pub async fn submit(&self, token: &str, event: Value) -> TestResponse {
        self.request("POST", "/api/events", Some(event), Some(token))
            .await
    }

    /// Open the event stream for `user_id` with a bearer header.
    pub async fn open_stream(&self, user_id: UserId) -> EventStream {
        let token = self.token_for(user_id);
        self.open_stream_at("/api/events/stream", Some(&token))
            .await
            .expect("Stream should open")
    }

    /// Open an event stream at `uri`, returning the status on failure.
    pub async fn open_stream_at(
        &self,
        uri: &str,
        token: Option<&str>,
    ) -> Result<EventStream, StatusCode> {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let req = req.body(Body::empty()).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        if response.status() != StatusCode::OK {
            return Err(response.status());
        }
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(
            content_type.starts_with("text/event-stream"),
            "unexpected content type {content_type}"
        );

        Ok(EventStream {
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        })
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.calls.turn_urls = vec!["turn:turn.test.local:3478".to_string()];
    config.calls.turn_secret = "integration-turn-secret".to_string();
    config
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Client side of a server-sent event stream.
pub struct EventStream {
    body: BodyDataStream,
    buffer: String,
}

impl EventStream {
    /// Next `data:` event, skipping keepalive comments.
    pub async fn next_event(&mut self) -> Option<Value> {
        self.next_event_within(EVENT_TIMEOUT).await
    }

    /// Next event whose `type` is `kind`, skipping everything else.
    pub async fn next_of_type(&mut self, kind: &str) -> Value {
        loop {
            let event = self
                .next_event()
                .await
                .unwrap_or_else(|| panic!("timed out waiting for '{kind}' event"));
            if event["type"] == kind {
                return event;
            }
        }
    }

    /// Next `user_status` event about `user_id`. Every stream also sees
    /// its own user's transitions, which are skipped here.
    pub async fn next_status_for(&mut self, user_id: UserId) -> Value {
        loop {
            let event = self.next_of_type("user_status").await;
            if event["userId"] == user_id.to_string() {
                return event;
            }
        }
    }

    /// Assert no event of `kind` arrives within the quiet period.
    pub async fn assert_no_event_of_type(&mut self, kind: &str) {
        let deadline = tokio::time::Instant::now() + QUIET_PERIOD;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return;
            }
            match self.next_event_within(remaining).await {
                Some(event) => assert_ne!(event["type"], kind, "unexpected event {event}"),
                None => return,
            }
        }
    }

    async fn next_event_within(&mut self, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            if let Some(event) = self.take_buffered() {
                return Some(event);
            }
            let chunk = tokio::time::timeout_at(deadline, self.body.next())
                .await
                .ok()??
                .expect("Stream body error");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    fn take_buffered(&mut self) -> Option<Value> {
        while let Some(end) = self.buffer.find("\n\n") {
            let frame: String = self.buffer.drain(..end + 2).collect();
            let data: Vec<&str> = frame
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(str::trim_start)
                .collect();
            if !data.is_empty() {
                return Some(serde_json::from_str(&data.join("\n")).expect("Invalid event JSON"));
            }
        }
        None
    }
}

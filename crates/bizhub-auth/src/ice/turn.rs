//! TURN REST-style credentials: a time-boxed username signed with a shared secret.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use bizhub_core::config::CallConfig;
use bizhub_core::error::AppError;
use bizhub_core::result::AppResult;
use bizhub_core::traits::{IceCredentialIssuer, IceCredentials};

type HmacSha256 = Hmac<Sha256>;

/// Issues short-lived TURN credentials derived from a secret shared with the relay.
#[derive(Clone)]
pub struct TurnCredentialIssuer {
    /// Shared secret.
    secret: String,
    /// Credential lifetime in seconds.
    ttl_seconds: u64,
    /// TURN server URLs.
    turn_urls: Vec<String>,
    /// STUN server URLs.
    stun_urls: Vec<String>,
}

impl std::fmt::Debug for TurnCredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnCredentialIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("turn_urls", &self.turn_urls)
            .field("stun_urls", &self.stun_urls)
            .finish()
    }
}

impl TurnCredentialIssuer {
    /// Creates a new issuer from call configuration.
    pub fn new(config: &CallConfig) -> Self {
        Self {
            secret: config.turn_secret.clone(),
            ttl_seconds: config.credential_ttl_seconds,
            turn_urls: config.turn_urls.clone(),
            stun_urls: config.stun_urls.clone(),
        }
    }

    /// Signs `username` with the shared secret.
    fn sign(&self, username: &str) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid TURN secret: {e}")))?;
        mac.update(username.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl IceCredentialIssuer for TurnCredentialIssuer {
    async fn generate(&self, username: &str) -> AppResult<IceCredentials> {
        let expires_at = Utc::now().timestamp() + self.ttl_seconds as i64;
        let username = format!("{expires_at}:{username}");
        let credential = self.sign(&username)?;

        tracing::debug!(username = %username, "Issued TURN credentials");

        Ok(IceCredentials {
            username,
            credential,
            ttl: self.ttl_seconds,
            urls: self.turn_urls.clone(),
        })
    }

    fn stun_urls(&self) -> Vec<String> {
        self.stun_urls.clone()
    }
}

//! ICE credential issuer trait for call signaling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Short-lived relay credentials issued for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCredentials {
    /// Time-boxed username (`<expiry>:<user>`).
    pub username: String,
    /// Credential derived from the username and the shared secret.
    pub credential: String,
    /// Lifetime in seconds.
    pub ttl: u64,
    /// Relay server URLs the credentials are valid for.
    pub urls: Vec<String>,
}

/// One entry of the `iceServers` list handed to a WebRTC peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// Server URLs (`stun:` or `turn:`).
    pub urls: Vec<String>,
    /// Username, present for TURN entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Credential, present for TURN entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServer {
    /// A credential-less STUN entry.
    pub fn stun(urls: Vec<String>) -> Self {
        Self {
            urls,
            username: None,
            credential: None,
        }
    }

    /// A TURN entry carrying issued credentials.
    pub fn turn(credentials: &IceCredentials) -> Self {
        Self {
            urls: credentials.urls.clone(),
            username: Some(credentials.username.clone()),
            credential: Some(credentials.credential.clone()),
        }
    }
}

/// Issues fresh ICE server lists for call participants.
///
/// Implementations may call out to a remote credential service, so
/// issuance is async and fallible. A failure aborts the call attempt
/// that requested it.
#[async_trait]
pub trait IceCredentialIssuer: Send + Sync + std::fmt::Debug + 'static {
    /// Generate relay credentials for `username`.
    async fn generate(&self, username: &str) -> AppResult<IceCredentials>;

    /// Static STUN servers included alongside issued credentials.
    fn stun_urls(&self) -> Vec<String>;

    /// Build the complete `iceServers` list for `username`.
    async fn ice_servers(&self, username: &str) -> AppResult<Vec<IceServer>> {
        let credentials = self.generate(username).await?;
        let mut servers = Vec::with_capacity(2);
        let stun = self.stun_urls();
        if !stun.is_empty() {
            servers.push(IceServer::stun(stun));
        }
        if !credentials.urls.is_empty() {
            servers.push(IceServer::turn(&credentials));
        }
        Ok(servers)
    }
}

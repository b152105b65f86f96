//! Call signaling and ICE server configuration.

use serde::{Deserialize, Serialize};

/// Call signaling configuration, including the TURN REST credential scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    /// Static STUN server URLs handed to every call.
    #[serde(default = "default_stun_urls")]
    pub stun_urls: Vec<String>,
    /// TURN server URLs. Empty disables TURN credentials.
    #[serde(default)]
    pub turn_urls: Vec<String>,
    /// Shared secret between this server and the TURN server.
    #[serde(default = "default_turn_secret")]
    pub turn_secret: String,
    /// Lifetime of issued TURN credentials in seconds.
    #[serde(default = "default_credential_ttl")]
    pub credential_ttl_seconds: u64,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            stun_urls: default_stun_urls(),
            turn_urls: Vec::new(),
            turn_secret: default_turn_secret(),
            credential_ttl_seconds: default_credential_ttl(),
        }
    }
}

fn default_stun_urls() -> Vec<String> {
    vec![
        "stun:stun.l.google.com:19302".to_string(),
        "stun:stun1.l.google.com:19302".to_string(),
    ]
}

fn default_turn_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_credential_ttl() -> u64 {
    86_400
}

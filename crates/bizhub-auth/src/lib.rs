//! # bizhub-auth
//!
//! Credential collaborators for the BizHub realtime relay.
//!
//! ## Modules
//!
//! - `jwt`: access token creation and validation; resolves a bearer token
//!   into a verified [`Identity`]
//! - `ice`: time-boxed TURN relay credentials for call signaling

pub mod ice;
pub mod identity;
pub mod jwt;

pub use ice::TurnCredentialIssuer;
pub use identity::Identity;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};

//! Interfaces implemented by external collaborators.

pub mod ice;

pub use ice::{IceCredentialIssuer, IceCredentials, IceServer};

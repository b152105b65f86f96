//! ICE relay credential issuance.

pub mod turn;

pub use turn::TurnCredentialIssuer;

//! # bizhub-entity
//!
//! Domain entity models for BizHub. Every struct in this crate is a
//! value object handed across crate boundaries; all derive `Debug`,
//! `Clone`, `Serialize` and `Deserialize`.

pub mod message;
pub mod user;

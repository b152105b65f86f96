//! Outbound frame serialization.

use std::sync::Arc;

use bizhub_core::error::AppError;

use super::types::OutboundEvent;

/// Serialize an event once into a frame shared by every recipient.
pub fn to_frame(event: &OutboundEvent) -> Result<Arc<str>, AppError> {
    let json = serde_json::to_string(event)?;
    Ok(Arc::from(json))
}

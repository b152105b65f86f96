//! Verified caller identity.

use serde::{Deserialize, Serialize};

use bizhub_core::types::{CompanyId, UserId};
use bizhub_entity::user::UserRole;

/// The verified identity behind an inbound request.
///
/// The realtime relay trusts this value unconditionally; producing it is
/// the token decoder's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Authenticated user.
    pub user_id: UserId,
    /// Role at token issuance.
    pub role: UserRole,
    /// Tenant the user belongs to.
    pub company_id: CompanyId,
}

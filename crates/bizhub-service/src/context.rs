//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizhub_auth::Identity;
use bizhub_core::types::{CompanyId, UserId};
use bizhub_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built from the verified identity and passed into service methods so
/// that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The user's company.
    pub company_id: CompanyId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
            company_id: identity.company_id,
            request_time: Utc::now(),
        }
    }
}

impl From<Identity> for RequestContext {
    fn from(identity: Identity) -> Self {
        Self::new(identity)
    }
}

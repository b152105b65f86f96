//! `AuthUser` extractor: resolves the bearer token into a request context.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;

use bizhub_core::error::AppError;
use bizhub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// `?token=` fallback for clients that cannot set headers (`EventSource`).
#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        let value = header
            .to_str()
            .map_err(|_| AppError::authentication("Invalid Authorization header"))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"));
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::authentication("Missing access token"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let identity = state.jwt_decoder.resolve(&token)?;
        Ok(AuthUser(RequestContext::new(identity)))
    }
}

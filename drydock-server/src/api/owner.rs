//! Owner Identity Extractor
//!
//! Every graph is exclusively owned by one user; the session layer in front
//! of this API resolves the user and forwards their id in the `x-owner-id`
//! header. Handlers take this extractor so no lookup can cross owners.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::api::error::ApiError;

/// Caller identity, extracted from the `x-owner-id` header
#[derive(Debug, Clone, Copy)]
pub struct Owner(pub Uuid);

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-owner-id")
            .ok_or_else(|| ApiError::Unauthorized("Missing x-owner-id header".to_string()))?;

        let value = header
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid x-owner-id header".to_string()))?;

        let id = Uuid::parse_str(value)
            .map_err(|_| ApiError::Unauthorized("Invalid x-owner-id header".to_string()))?;

        Ok(Owner(id))
    }
}

//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::blueprint::BlueprintError;
use crate::service::deployment::DeploymentError;
use crate::service::promotion::PromotionError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
    DatabaseError(sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<BlueprintError> for ApiError {
    fn from(err: BlueprintError) -> Self {
        match err {
            BlueprintError::NotFound(id) => {
                ApiError::NotFound(format!("Blueprint {} not found", id))
            }
            BlueprintError::ServiceNotFound(slot_id) => {
                ApiError::NotFound(format!("Service '{}' not found", slot_id))
            }
            BlueprintError::Conflict(msg) => ApiError::Conflict(msg),
            BlueprintError::ValidationError(msg) => ApiError::BadRequest(msg),
            BlueprintError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<DeploymentError> for ApiError {
    fn from(err: DeploymentError) -> Self {
        match err {
            DeploymentError::NotFound(id) => {
                ApiError::NotFound(format!("Deployment {} not found", id))
            }
            DeploymentError::ServiceNotFound(slot_id) => {
                ApiError::NotFound(format!("Service '{}' not found", slot_id))
            }
            DeploymentError::Conflict(msg) => ApiError::Conflict(msg),
            DeploymentError::InvalidTransition(msg) => ApiError::BadRequest(msg),
            DeploymentError::ValidationError(msg) => ApiError::BadRequest(msg),
            DeploymentError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<PromotionError> for ApiError {
    fn from(err: PromotionError) -> Self {
        match err {
            PromotionError::BlueprintNotFound(id) => {
                ApiError::NotFound(format!("Blueprint {} not found", id))
            }
            PromotionError::Conflict(msg) => ApiError::Conflict(msg),
            PromotionError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

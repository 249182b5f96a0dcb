//! API Module
//!
//! HTTP API layer for the server.
//! Each submodule handles endpoints for a specific domain.

pub mod blueprint;
pub mod deployment;
pub mod error;
pub mod health;
pub mod owner;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the main API router with all endpoints
pub fn create_router(pool: PgPool) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Blueprint endpoints
        .route("/blueprint/create", post(blueprint::create_blueprint))
        .route("/blueprint/list", get(blueprint::list_blueprints))
        .route("/blueprint/{id}", get(blueprint::get_blueprint))
        .route("/blueprint/{id}", delete(blueprint::archive_blueprint))
        .route("/blueprint/{id}/publish", post(blueprint::publish_blueprint))
        .route("/blueprint/{id}/services", put(blueprint::upsert_service))
        .route("/blueprint/{id}/services", get(blueprint::list_services))
        .route(
            "/blueprint/{id}/service/{slot_id}",
            delete(blueprint::delete_service),
        )
        // Deployment endpoints
        .route("/deployment/create", post(deployment::create_deployment))
        .route("/deployment/list", get(deployment::list_deployments))
        .route("/deployment/{id}", get(deployment::get_deployment))
        .route("/deployment/{id}", delete(deployment::archive_deployment))
        .route("/deployment/{id}/services", put(deployment::upsert_service))
        .route("/deployment/{id}/services", get(deployment::list_services))
        .route(
            "/deployment/{id}/service/{slot_id}",
            delete(deployment::delete_service),
        )
        .route(
            "/deployment/{id}/reconcile",
            post(deployment::reconcile_deployment),
        )
        .route(
            "/deployment/{id}/service/{slot_id}/reconcile",
            post(deployment::reconcile_service),
        )
        // Add state and middleware
        .with_state(pool)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

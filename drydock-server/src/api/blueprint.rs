//! Blueprint API Handlers
//!
//! HTTP endpoints for blueprint management and blueprint-side slot editing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use drydock_core::domain::blueprint::Blueprint;
use drydock_core::domain::deployment::Deployment;
use drydock_core::dto::blueprint::{BlueprintSummary, CreateBlueprint, UpsertBlueprintService};
use drydock_core::dto::service::ServiceView;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::owner::Owner;
use crate::service::{blueprint_service, promotion_service};

/// POST /blueprint/create
/// Create a new blueprint
pub async fn create_blueprint(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Json(req): Json<CreateBlueprint>,
) -> ApiResult<(StatusCode, Json<Blueprint>)> {
    tracing::info!("Creating blueprint: {}", req.name);

    let blueprint = blueprint_service::create_blueprint(&pool, owner_id, req).await?;

    Ok((StatusCode::CREATED, Json(blueprint)))
}

/// GET /blueprint/list
/// List the caller's active blueprints
pub async fn list_blueprints(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
) -> ApiResult<Json<Vec<BlueprintSummary>>> {
    tracing::debug!("Listing blueprints for owner {}", owner_id);

    let blueprints = blueprint_service::list_blueprints(&pool, owner_id).await?;

    Ok(Json(blueprints))
}

/// GET /blueprint/{id}
/// Get a blueprint by ID
pub async fn get_blueprint(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Blueprint>> {
    tracing::debug!("Getting blueprint: {}", id);

    let blueprint = blueprint_service::get_blueprint(&pool, owner_id, id).await?;

    Ok(Json(blueprint))
}

/// DELETE /blueprint/{id}
/// Archive a blueprint and purge its service slots
pub async fn archive_blueprint(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Archiving blueprint: {}", id);

    blueprint_service::archive_blueprint(&pool, owner_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /blueprint/{id}/publish
/// Promote a blueprint into a new deployment
pub async fn publish_blueprint(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Deployment>)> {
    tracing::info!("Publishing blueprint: {}", id);

    let deployment = promotion_service::promote_blueprint(&pool, owner_id, id).await?;

    Ok((StatusCode::CREATED, Json(deployment)))
}

/// PUT /blueprint/{id}/services
/// Create or patch a service slot; 201 when the slot is new
pub async fn upsert_service(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<UpsertBlueprintService>,
) -> ApiResult<(StatusCode, Json<ServiceView>)> {
    tracing::debug!("Upserting service {} in blueprint {}", req.service_id, id);

    let (service, created) = blueprint_service::upsert_service(&pool, owner_id, id, req).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(service.into())))
}

/// GET /blueprint/{id}/services
/// List a blueprint's service slots in creation order
pub async fn list_services(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ServiceView>>> {
    tracing::debug!("Listing services for blueprint {}", id);

    let services = blueprint_service::list_services(&pool, owner_id, id).await?;

    Ok(Json(services.into_iter().map(Into::into).collect()))
}

/// DELETE /blueprint/{id}/service/{slot_id}
/// Delete a service slot
pub async fn delete_service(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path((id, slot_id)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting service {} from blueprint {}", slot_id, id);

    blueprint_service::delete_service(&pool, owner_id, id, &slot_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

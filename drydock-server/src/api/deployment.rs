//! Deployment API Handlers
//!
//! HTTP endpoints for deployment management, deployment-side slot editing and
//! reconciliation write-backs.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use drydock_core::domain::deployment::Deployment;
use drydock_core::dto::deployment::{
    CreateDeployment, DeploymentSummary, ReconcileDeployment, ReconcileService,
    UpsertDeploymentService,
};
use drydock_core::dto::service::DeploymentServiceView;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::owner::Owner;
use crate::service::deployment_service;

/// POST /deployment/create
/// Create a deployment directly, from a blank canvas
pub async fn create_deployment(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Json(req): Json<CreateDeployment>,
) -> ApiResult<(StatusCode, Json<Deployment>)> {
    tracing::info!("Creating deployment for owner {}", owner_id);

    let deployment = deployment_service::create_deployment(&pool, owner_id, req).await?;

    Ok((StatusCode::CREATED, Json(deployment)))
}

/// GET /deployment/list
/// List the caller's active deployments
pub async fn list_deployments(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
) -> ApiResult<Json<Vec<DeploymentSummary>>> {
    tracing::debug!("Listing deployments for owner {}", owner_id);

    let deployments = deployment_service::list_deployments(&pool, owner_id).await?;

    Ok(Json(deployments))
}

/// GET /deployment/{id}
/// Get a deployment by ID
pub async fn get_deployment(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Deployment>> {
    tracing::debug!("Getting deployment: {}", id);

    let deployment = deployment_service::get_deployment(&pool, owner_id, id).await?;

    Ok(Json(deployment))
}

/// DELETE /deployment/{id}
/// Archive a deployment
pub async fn archive_deployment(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Archiving deployment: {}", id);

    deployment_service::archive_deployment(&pool, owner_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /deployment/{id}/services
/// Create or replace a service slot; 201 when the slot is new
pub async fn upsert_service(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<UpsertDeploymentService>,
) -> ApiResult<(StatusCode, Json<DeploymentServiceView>)> {
    tracing::debug!("Upserting service {} in deployment {}", req.service_id, id);

    let (service, created) = deployment_service::upsert_service(&pool, owner_id, id, req).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(service.into())))
}

/// GET /deployment/{id}/services
/// List a deployment's service slots in creation order
pub async fn list_services(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<DeploymentServiceView>>> {
    tracing::debug!("Listing services for deployment {}", id);

    let services = deployment_service::list_services(&pool, owner_id, id).await?;

    Ok(Json(services.into_iter().map(Into::into).collect()))
}

/// DELETE /deployment/{id}/service/{slot_id}
/// Delete a service slot
pub async fn delete_service(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path((id, slot_id)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting service {} from deployment {}", slot_id, id);

    deployment_service::delete_service(&pool, owner_id, id, &slot_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /deployment/{id}/reconcile
/// Apply a platform status write-back to a deployment
pub async fn reconcile_deployment(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<ReconcileDeployment>,
) -> ApiResult<Json<Deployment>> {
    tracing::info!("Reconciling deployment {} to {:?}", id, req.status);

    let deployment = deployment_service::reconcile_deployment(&pool, owner_id, id, req).await?;

    Ok(Json(deployment))
}

/// POST /deployment/{id}/service/{slot_id}/reconcile
/// Apply a platform status write-back to a deployed service
pub async fn reconcile_service(
    State(pool): State<PgPool>,
    Owner(owner_id): Owner,
    Path((id, slot_id)): Path<(Uuid, String)>,
    Json(req): Json<ReconcileService>,
) -> ApiResult<Json<DeploymentServiceView>> {
    tracing::info!(
        "Reconciling service {} in deployment {} to {:?}",
        slot_id,
        id,
        req.status
    );

    let service =
        deployment_service::reconcile_service(&pool, owner_id, id, &slot_id, req).await?;

    Ok(Json(service.into()))
}

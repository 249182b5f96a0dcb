//! Promotion Service
//!
//! Snapshots a blueprint graph into a new, independent deployment graph.
//! A blueprint can be promoted any number of times; every call creates a
//! fresh deployment with its own copies of the service slots.

use drydock_core::domain::deployment::{Deployment, DeploymentService};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{
    blueprint_repository, blueprint_service_repository, deployment_repository,
    is_unique_violation,
};

/// Service error type
#[derive(Debug)]
pub enum PromotionError {
    BlueprintNotFound(Uuid),
    Conflict(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for PromotionError {
    fn from(err: sqlx::Error) -> Self {
        PromotionError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, PromotionError>;

/// Promote a blueprint into a new deployment
///
/// The deployment, its service copies and the publish flag on the source are
/// written in a single transaction; on any failure the blueprint stays
/// unpublished and no partial deployment exists.
pub async fn promote_blueprint(
    pool: &PgPool,
    owner_id: Uuid,
    blueprint_id: Uuid,
) -> Result<Deployment> {
    let blueprint = blueprint_repository::find_by_id(pool, owner_id, blueprint_id)
        .await?
        .ok_or(PromotionError::BlueprintNotFound(blueprint_id))?;

    let sources = blueprint_service_repository::list_for_blueprint(pool, blueprint.id).await?;

    let deployment = Deployment::promoted_from(&blueprint);
    let services = DeploymentService::promote_all(&sources, deployment.id);

    match deployment_repository::create_promoted(pool, blueprint.id, &deployment, &services).await
    {
        Ok(()) => {}
        Err(err) if is_unique_violation(&err) => {
            return Err(PromotionError::Conflict(format!(
                "Deployment name '{}' is already in use",
                deployment.name
            )));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(
        "Blueprint {} promoted to deployment {} with {} services",
        blueprint.id,
        deployment.id,
        services.len()
    );

    Ok(deployment)
}

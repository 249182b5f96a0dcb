//! Deployment Service
//!
//! Business logic for deployment management, deployment-side slot editing and
//! reconciliation write-backs. Slot upserts are replace-like: all mutable
//! fields are overwritten in one call, unlike the blueprint-side patch.

use drydock_core::domain::deployment::{
    Deployment, DeploymentService, DeploymentStatus, ServiceStatus,
};
use drydock_core::dto::deployment::{
    CreateDeployment, DeploymentSummary, ReconcileDeployment, ReconcileService,
    UpsertDeploymentService,
};
use drydock_core::namegen;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::repository::{
    deployment_repository, deployment_service_repository, is_unique_violation,
};

/// Service error type
#[derive(Debug)]
pub enum DeploymentError {
    NotFound(Uuid),
    ServiceNotFound(String),
    Conflict(String),
    InvalidTransition(String),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for DeploymentError {
    fn from(err: sqlx::Error) -> Self {
        DeploymentError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, DeploymentError>;

/// Create a deployment directly, without a source blueprint
///
/// The display name is drawn from the shared name pool, avoiding the owner's
/// active deployment names.
pub async fn create_deployment(
    pool: &PgPool,
    owner_id: Uuid,
    req: CreateDeployment,
) -> Result<Deployment> {
    let existing: HashSet<String> = deployment_repository::list_active_names(pool, owner_id)
        .await?
        .into_iter()
        .collect();
    let name = namegen::generate_name(&existing);

    let now = chrono::Utc::now();
    let deployment = Deployment {
        id: Uuid::new_v4(),
        owner_id,
        source_blueprint_id: None,
        name,
        description: req.description,
        platform_project_id: None,
        platform_environment_id: None,
        status: DeploymentStatus::Draft,
        is_active: true,
        deployed_at: None,
        created_at: now,
        updated_at: now,
    };

    match deployment_repository::insert(pool, &deployment).await {
        Ok(()) => {
            tracing::info!("Deployment created: {} ({})", deployment.name, deployment.id);
            Ok(deployment)
        }
        Err(err) if is_unique_violation(&err) => Err(DeploymentError::Conflict(format!(
            "Deployment name '{}' is already in use",
            deployment.name
        ))),
        Err(err) => Err(err.into()),
    }
}

/// Get an active deployment by ID
pub async fn get_deployment(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Deployment> {
    let deployment = deployment_repository::find_by_id(pool, owner_id, id)
        .await?
        .ok_or(DeploymentError::NotFound(id))?;

    Ok(deployment)
}

/// List the owner's active deployments
pub async fn list_deployments(pool: &PgPool, owner_id: Uuid) -> Result<Vec<DeploymentSummary>> {
    let deployments = deployment_repository::list_active(pool, owner_id).await?;

    Ok(deployments
        .into_iter()
        .map(|(deployment, services_count)| DeploymentSummary {
            id: deployment.id,
            name: deployment.name,
            description: deployment.description,
            status: deployment.status,
            source_blueprint_id: deployment.source_blueprint_id,
            services_count,
            deployed_at: deployment.deployed_at,
            created_at: deployment.created_at,
            updated_at: deployment.updated_at,
        })
        .collect())
}

/// Archive a deployment
pub async fn archive_deployment(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<()> {
    let archived = deployment_repository::archive(pool, owner_id, id).await?;

    if !archived {
        return Err(DeploymentError::NotFound(id));
    }

    tracing::info!("Deployment archived: {}", id);

    Ok(())
}

/// Create or replace a service slot, keyed by (deployment, slot handle)
///
/// Returns the stored slot and whether it was newly created.
pub async fn upsert_service(
    pool: &PgPool,
    owner_id: Uuid,
    deployment_id: Uuid,
    req: UpsertDeploymentService,
) -> Result<(DeploymentService, bool)> {
    let deployment = deployment_repository::find_by_id(pool, owner_id, deployment_id)
        .await?
        .ok_or(DeploymentError::NotFound(deployment_id))?;

    validate_upsert_request(&req)?;

    if let Some(mut existing) =
        deployment_service_repository::find_by_slot(pool, deployment.id, &req.service_id).await?
    {
        replace_fields(&mut existing, &req);
        deployment_service_repository::update(pool, &existing).await?;
        return Ok((existing, false));
    }

    let service = new_service(deployment.id, &req);
    match deployment_service_repository::insert(pool, &service).await {
        Ok(()) => {
            tracing::info!(
                "Deployment service created: {} in deployment {}",
                service.slot_id,
                deployment.id
            );
            Ok((service, true))
        }
        Err(err) if is_unique_violation(&err) => {
            // Lost a create/create race; the slot exists now, so retry as a replace
            let mut existing = deployment_service_repository::find_by_slot(
                pool,
                deployment.id,
                &req.service_id,
            )
            .await?
            .ok_or(DeploymentError::DatabaseError(err))?;
            replace_fields(&mut existing, &req);
            deployment_service_repository::update(pool, &existing).await?;
            Ok((existing, false))
        }
        Err(err) => Err(err.into()),
    }
}

/// Delete a service slot
pub async fn delete_service(
    pool: &PgPool,
    owner_id: Uuid,
    deployment_id: Uuid,
    slot_id: &str,
) -> Result<()> {
    let deployment = deployment_repository::find_by_id(pool, owner_id, deployment_id)
        .await?
        .ok_or(DeploymentError::NotFound(deployment_id))?;

    let deleted = deployment_service_repository::delete(pool, deployment.id, slot_id).await?;

    if !deleted {
        return Err(DeploymentError::ServiceNotFound(slot_id.to_string()));
    }

    tracing::info!(
        "Deployment service deleted: {} from deployment {}",
        slot_id,
        deployment.id
    );

    Ok(())
}

/// List the slots of a deployment in creation order
pub async fn list_services(
    pool: &PgPool,
    owner_id: Uuid,
    deployment_id: Uuid,
) -> Result<Vec<DeploymentService>> {
    let deployment = deployment_repository::find_by_id(pool, owner_id, deployment_id)
        .await?
        .ok_or(DeploymentError::NotFound(deployment_id))?;

    let services =
        deployment_service_repository::list_for_deployment(pool, deployment.id).await?;
    Ok(services)
}

/// How many times a reconcile write-back re-reads and re-validates after a
/// concurrent report moved the row between read and write
const RECONCILE_ATTEMPTS: usize = 3;

/// Apply a reconciliation write-back to a deployment
///
/// The transition is validated against the status that was read, and the
/// update only lands if that status is still current (compare-and-swap).
/// When a concurrent report wins the race, the fresh status is re-read and
/// the transition re-validated, so a report that became backward is rejected
/// instead of overwriting the newer state.
pub async fn reconcile_deployment(
    pool: &PgPool,
    owner_id: Uuid,
    id: Uuid,
    req: ReconcileDeployment,
) -> Result<Deployment> {
    for _ in 0..RECONCILE_ATTEMPTS {
        let deployment = deployment_repository::find_by_id(pool, owner_id, id)
            .await?
            .ok_or(DeploymentError::NotFound(id))?;

        if !deployment.status.can_transition_to(req.status) {
            return Err(DeploymentError::InvalidTransition(format!(
                "Deployment {} cannot move from {:?} to {:?}",
                id, deployment.status, req.status
            )));
        }

        let deployed_at = deployed_at_for(
            req.status == DeploymentStatus::Deployed,
            req.deployed_at,
        );

        let updated = deployment_repository::reconcile(
            pool,
            deployment.id,
            deployment.status,
            req.status,
            req.platform_project_id.as_deref(),
            req.platform_environment_id.as_deref(),
            deployed_at,
        )
        .await?;

        if updated {
            tracing::info!("Deployment {} reconciled to {:?}", id, req.status);
            return get_deployment(pool, owner_id, id).await;
        }
    }

    Err(DeploymentError::Conflict(format!(
        "Deployment {} status changed concurrently; retry",
        id
    )))
}

/// Apply a reconciliation write-back to a deployed service
///
/// Same compare-and-swap discipline as [`reconcile_deployment`]: validate
/// against the status that was read, only write if it is still current, and
/// re-validate on a lost race.
pub async fn reconcile_service(
    pool: &PgPool,
    owner_id: Uuid,
    deployment_id: Uuid,
    slot_id: &str,
    req: ReconcileService,
) -> Result<DeploymentService> {
    let deployment = deployment_repository::find_by_id(pool, owner_id, deployment_id)
        .await?
        .ok_or(DeploymentError::NotFound(deployment_id))?;

    for _ in 0..RECONCILE_ATTEMPTS {
        let service = deployment_service_repository::find_by_slot(pool, deployment.id, slot_id)
            .await?
            .ok_or_else(|| DeploymentError::ServiceNotFound(slot_id.to_string()))?;

        if !service.status.can_transition_to(req.status) {
            return Err(DeploymentError::InvalidTransition(format!(
                "Service {} cannot move from {:?} to {:?}",
                slot_id, service.status, req.status
            )));
        }

        let deployed_at = deployed_at_for(req.status == ServiceStatus::Running, req.deployed_at);

        let updated = deployment_service_repository::reconcile(
            pool,
            service.id,
            service.status,
            req.status,
            req.platform_service_id.as_deref(),
            req.platform_deployment_id.as_deref(),
            req.public_url.as_deref(),
            deployed_at,
        )
        .await?;

        if updated {
            tracing::info!(
                "Deployment service {} reconciled to {:?}",
                slot_id,
                req.status
            );

            let stored =
                deployment_service_repository::find_by_slot(pool, deployment.id, slot_id)
                    .await?
                    .ok_or_else(|| DeploymentError::ServiceNotFound(slot_id.to_string()))?;
            return Ok(stored);
        }
    }

    Err(DeploymentError::Conflict(format!(
        "Service {} status changed concurrently; retry",
        slot_id
    )))
}

// =============================================================================
// Slot Construction & Replacement
// =============================================================================

fn new_service(deployment_id: Uuid, req: &UpsertDeploymentService) -> DeploymentService {
    let now = chrono::Utc::now();
    DeploymentService {
        id: Uuid::new_v4(),
        deployment_id,
        source_service_id: None,
        slot_id: req.service_id.clone(),
        name: req.name.clone(),
        image: req.image.clone(),
        registry_username: req.registry_username.clone(),
        registry_password: req.registry_password.clone(),
        platform_service_id: None,
        platform_deployment_id: None,
        cpu: req.cpu,
        memory: req.memory,
        variables: req.variables.clone(),
        networking: req.networking,
        position: req.position,
        status: ServiceStatus::Pending,
        public_url: None,
        deployed_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Replace every mutable field with the request's values
///
/// Registry credentials are only overwritten when provided; runtime state
/// (status, platform ids, public_url) stays with the reconciler.
fn replace_fields(service: &mut DeploymentService, req: &UpsertDeploymentService) {
    service.name = req.name.clone();
    service.image = req.image.clone();
    service.cpu = req.cpu;
    service.memory = req.memory;
    service.variables = req.variables.clone();
    service.networking = req.networking;
    service.position = req.position;
    if let Some(username) = &req.registry_username {
        service.registry_username = Some(username.clone());
    }
    if let Some(password) = &req.registry_password {
        service.registry_password = Some(password.clone());
    }
}

/// Timestamp to stamp when a status report reaches its terminal running state
///
/// Only entering deployed/running stamps the field; reports for any other
/// status leave the stored value untouched, even if they carry a timestamp.
fn deployed_at_for(
    reached: bool,
    reported: Option<chrono::DateTime<chrono::Utc>>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    if reached {
        Some(reported.unwrap_or_else(chrono::Utc::now))
    } else {
        None
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_upsert_request(req: &UpsertDeploymentService) -> Result<()> {
    if req.service_id.trim().is_empty() {
        return Err(DeploymentError::ValidationError(
            "Service id cannot be empty".to_string(),
        ));
    }

    if req.service_id.len() > 255 {
        return Err(DeploymentError::ValidationError(
            "Service id is too long (max 255 characters)".to_string(),
        ));
    }

    if req.name.trim().is_empty() {
        return Err(DeploymentError::ValidationError(
            "Service name cannot be empty".to_string(),
        ));
    }

    if req.cpu <= 0 {
        return Err(DeploymentError::ValidationError(
            "CPU allocation must be positive".to_string(),
        ));
    }

    if req.memory <= 0 {
        return Err(DeploymentError::ValidationError(
            "Memory allocation must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_core::domain::{Networking, Position};
    use std::collections::HashMap;

    fn upsert_req(slot: &str) -> UpsertDeploymentService {
        UpsertDeploymentService {
            service_id: slot.to_string(),
            name: "api".to_string(),
            image: Some("nginx:1.27".to_string()),
            registry_username: None,
            registry_password: None,
            cpu: 8,
            memory: 8,
            variables: HashMap::new(),
            networking: Networking::default(),
            position: Position::default(),
        }
    }

    #[test]
    fn test_validate_empty_slot_id() {
        let mut req = upsert_req("");
        req.service_id = " ".to_string();
        assert!(matches!(
            validate_upsert_request(&req),
            Err(DeploymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_nonpositive_resources() {
        let mut req = upsert_req("svc1");
        req.cpu = 0;
        assert!(matches!(
            validate_upsert_request(&req),
            Err(DeploymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_replace_overwrites_all_mutable_fields() {
        let mut service = new_service(Uuid::new_v4(), &upsert_req("svc1"));
        service
            .variables
            .insert("PORT".to_string(), "8080".to_string());

        let mut req = upsert_req("svc1");
        req.name = "worker".to_string();
        req.image = None;
        req.cpu = 16;
        req.position = Position { x: 4.0, y: 2.0 };
        replace_fields(&mut service, &req);

        assert_eq!(service.name, "worker");
        assert!(service.image.is_none());
        assert_eq!(service.cpu, 16);
        assert!(service.variables.is_empty());
        assert_eq!(service.position, Position { x: 4.0, y: 2.0 });
    }

    #[test]
    fn test_replace_keeps_credentials_unless_provided() {
        let mut service = new_service(Uuid::new_v4(), &upsert_req("svc1"));
        service.registry_username = Some("acme".to_string());
        service.registry_password = Some("hunter2".to_string());

        replace_fields(&mut service, &upsert_req("svc1"));
        assert_eq!(service.registry_username.as_deref(), Some("acme"));
        assert_eq!(service.registry_password.as_deref(), Some("hunter2"));

        let mut req = upsert_req("svc1");
        req.registry_password = Some("rotated".to_string());
        replace_fields(&mut service, &req);
        assert_eq!(service.registry_password.as_deref(), Some("rotated"));
    }

    #[test]
    fn test_replace_never_touches_runtime_state() {
        let mut service = new_service(Uuid::new_v4(), &upsert_req("svc1"));
        service.status = ServiceStatus::Running;
        service.platform_service_id = Some("ext-1".to_string());
        service.public_url = Some("https://svc1.example".to_string());

        replace_fields(&mut service, &upsert_req("svc1"));

        assert_eq!(service.status, ServiceStatus::Running);
        assert_eq!(service.platform_service_id.as_deref(), Some("ext-1"));
        assert_eq!(service.public_url.as_deref(), Some("https://svc1.example"));
    }

    #[test]
    fn test_deployed_at_stamped_on_arrival() {
        let stamped = deployed_at_for(true, None);
        assert!(stamped.is_some());

        let reported = chrono::Utc::now() - chrono::Duration::minutes(5);
        assert_eq!(deployed_at_for(true, Some(reported)), Some(reported));

        assert_eq!(deployed_at_for(false, None), None);
    }

    #[test]
    fn test_deployed_at_ignored_before_arrival() {
        // A deploying report carrying a timestamp must not stamp the field
        let reported = chrono::Utc::now();
        assert_eq!(deployed_at_for(false, Some(reported)), None);
    }
}

//! Blueprint Service
//!
//! Business logic for blueprint management and blueprint-side slot editing.
//! Slot upserts are patch-like: only the fields present in the request are
//! applied to an existing slot.

use drydock_core::domain::blueprint::{Blueprint, BlueprintService};
use drydock_core::domain::{DEFAULT_CPU, DEFAULT_MEMORY, Networking, Position};
use drydock_core::dto::blueprint::{BlueprintSummary, CreateBlueprint, UpsertBlueprintService};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{
    blueprint_repository, blueprint_service_repository, is_unique_violation,
};

/// Service error type
#[derive(Debug)]
pub enum BlueprintError {
    NotFound(Uuid),
    ServiceNotFound(String),
    Conflict(String),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for BlueprintError {
    fn from(err: sqlx::Error) -> Self {
        BlueprintError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, BlueprintError>;

/// Create a new blueprint
pub async fn create_blueprint(
    pool: &PgPool,
    owner_id: Uuid,
    req: CreateBlueprint,
) -> Result<Blueprint> {
    validate_blueprint_request(&req)?;

    let now = chrono::Utc::now();
    let blueprint = Blueprint {
        id: Uuid::new_v4(),
        owner_id,
        name: req.name.clone(),
        description: req.description.clone(),
        config: req.config.unwrap_or_else(|| serde_json::json!({})),
        is_active: true,
        is_published: false,
        created_at: now,
        updated_at: now,
    };

    match blueprint_repository::create(pool, &blueprint).await {
        Ok(()) => {
            tracing::info!("Blueprint created: {} ({})", blueprint.name, blueprint.id);
            Ok(blueprint)
        }
        Err(err) if is_unique_violation(&err) => Err(BlueprintError::Conflict(format!(
            "Blueprint name '{}' is already in use",
            req.name
        ))),
        Err(err) => Err(err.into()),
    }
}

/// Get an active blueprint by ID
pub async fn get_blueprint(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Blueprint> {
    let blueprint = blueprint_repository::find_by_id(pool, owner_id, id)
        .await?
        .ok_or(BlueprintError::NotFound(id))?;

    Ok(blueprint)
}

/// List the owner's active blueprints
pub async fn list_blueprints(pool: &PgPool, owner_id: Uuid) -> Result<Vec<BlueprintSummary>> {
    let blueprints = blueprint_repository::list_active(pool, owner_id).await?;

    Ok(blueprints
        .into_iter()
        .map(|(blueprint, services_count)| BlueprintSummary {
            id: blueprint.id,
            name: blueprint.name,
            description: blueprint.description,
            is_published: blueprint.is_published,
            services_count,
            created_at: blueprint.created_at,
            updated_at: blueprint.updated_at,
        })
        .collect())
}

/// Archive a blueprint: deactivate it and purge its slots in one step
pub async fn archive_blueprint(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<()> {
    let archived = blueprint_repository::archive(pool, owner_id, id).await?;

    if !archived {
        return Err(BlueprintError::NotFound(id));
    }

    tracing::info!("Blueprint archived: {}", id);

    Ok(())
}

/// Create or patch a service slot, keyed by (blueprint, slot handle)
///
/// Returns the stored slot and whether it was newly created.
pub async fn upsert_service(
    pool: &PgPool,
    owner_id: Uuid,
    blueprint_id: Uuid,
    req: UpsertBlueprintService,
) -> Result<(BlueprintService, bool)> {
    let blueprint = blueprint_repository::find_by_id(pool, owner_id, blueprint_id)
        .await?
        .ok_or(BlueprintError::NotFound(blueprint_id))?;

    validate_upsert_request(&req)?;

    if let Some(mut existing) =
        blueprint_service_repository::find_by_slot(pool, blueprint.id, &req.service_id).await?
    {
        apply_patch(&mut existing, &req);
        blueprint_service_repository::update(pool, &existing).await?;
        return Ok((existing, false));
    }

    let service = new_service(blueprint.id, &req);
    match blueprint_service_repository::insert(pool, &service).await {
        Ok(()) => {
            tracing::info!(
                "Blueprint service created: {} in blueprint {}",
                service.slot_id,
                blueprint.id
            );
            Ok((service, true))
        }
        Err(err) if is_unique_violation(&err) => {
            // Lost a create/create race; the slot exists now, so retry as a patch
            let mut existing =
                blueprint_service_repository::find_by_slot(pool, blueprint.id, &req.service_id)
                    .await?
                    .ok_or(BlueprintError::DatabaseError(err))?;
            apply_patch(&mut existing, &req);
            blueprint_service_repository::update(pool, &existing).await?;
            Ok((existing, false))
        }
        Err(err) => Err(err.into()),
    }
}

/// Delete a service slot
pub async fn delete_service(
    pool: &PgPool,
    owner_id: Uuid,
    blueprint_id: Uuid,
    slot_id: &str,
) -> Result<()> {
    let blueprint = blueprint_repository::find_by_id(pool, owner_id, blueprint_id)
        .await?
        .ok_or(BlueprintError::NotFound(blueprint_id))?;

    let deleted = blueprint_service_repository::delete(pool, blueprint.id, slot_id).await?;

    if !deleted {
        return Err(BlueprintError::ServiceNotFound(slot_id.to_string()));
    }

    tracing::info!(
        "Blueprint service deleted: {} from blueprint {}",
        slot_id,
        blueprint.id
    );

    Ok(())
}

/// List the slots of a blueprint in creation order
pub async fn list_services(
    pool: &PgPool,
    owner_id: Uuid,
    blueprint_id: Uuid,
) -> Result<Vec<BlueprintService>> {
    let blueprint = blueprint_repository::find_by_id(pool, owner_id, blueprint_id)
        .await?
        .ok_or(BlueprintError::NotFound(blueprint_id))?;

    let services = blueprint_service_repository::list_for_blueprint(pool, blueprint.id).await?;
    Ok(services)
}

// =============================================================================
// Slot Construction & Patching
// =============================================================================

fn new_service(blueprint_id: Uuid, req: &UpsertBlueprintService) -> BlueprintService {
    let now = chrono::Utc::now();
    BlueprintService {
        id: Uuid::new_v4(),
        blueprint_id,
        slot_id: req.service_id.clone(),
        name: req.name.clone().unwrap_or_else(|| "New Service".to_string()),
        image: req.image.clone(),
        registry_username: req.registry_username.clone(),
        registry_password: req.registry_password.clone(),
        cpu: req.cpu.unwrap_or(DEFAULT_CPU),
        memory: req.memory.unwrap_or(DEFAULT_MEMORY),
        variables: req.variables.clone().unwrap_or_default(),
        networking: req.networking.unwrap_or_else(Networking::default),
        position: req.position.unwrap_or_else(Position::default),
        created_at: now,
        updated_at: now,
    }
}

/// Apply only the fields present in the request; absent fields stay untouched
fn apply_patch(service: &mut BlueprintService, req: &UpsertBlueprintService) {
    if let Some(name) = &req.name {
        service.name = name.clone();
    }
    if let Some(image) = &req.image {
        service.image = Some(image.clone());
    }
    if let Some(username) = &req.registry_username {
        service.registry_username = Some(username.clone());
    }
    if let Some(password) = &req.registry_password {
        service.registry_password = Some(password.clone());
    }
    if let Some(cpu) = req.cpu {
        service.cpu = cpu;
    }
    if let Some(memory) = req.memory {
        service.memory = memory;
    }
    if let Some(variables) = &req.variables {
        service.variables = variables.clone();
    }
    if let Some(networking) = req.networking {
        service.networking = networking;
    }
    if let Some(position) = req.position {
        service.position = position;
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_blueprint_request(req: &CreateBlueprint) -> Result<()> {
    if req.name.trim().is_empty() {
        return Err(BlueprintError::ValidationError(
            "Blueprint name cannot be empty".to_string(),
        ));
    }

    if req.name.len() > 255 {
        return Err(BlueprintError::ValidationError(
            "Blueprint name is too long (max 255 characters)".to_string(),
        ));
    }

    if let Some(config) = &req.config {
        if !config.is_object() {
            return Err(BlueprintError::ValidationError(
                "Blueprint config must be a JSON object".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_upsert_request(req: &UpsertBlueprintService) -> Result<()> {
    if req.service_id.trim().is_empty() {
        return Err(BlueprintError::ValidationError(
            "Service id cannot be empty".to_string(),
        ));
    }

    if req.service_id.len() > 255 {
        return Err(BlueprintError::ValidationError(
            "Service id is too long (max 255 characters)".to_string(),
        ));
    }

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(BlueprintError::ValidationError(
                "Service name cannot be empty".to_string(),
            ));
        }
    }

    if req.cpu.is_some_and(|cpu| cpu <= 0) {
        return Err(BlueprintError::ValidationError(
            "CPU allocation must be positive".to_string(),
        ));
    }

    if req.memory.is_some_and(|memory| memory <= 0) {
        return Err(BlueprintError::ValidationError(
            "Memory allocation must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert_req(slot: &str) -> UpsertBlueprintService {
        UpsertBlueprintService {
            service_id: slot.to_string(),
            name: None,
            image: None,
            registry_username: None,
            registry_password: None,
            cpu: None,
            memory: None,
            variables: None,
            networking: None,
            position: None,
        }
    }

    #[test]
    fn test_validate_empty_name() {
        let req = CreateBlueprint {
            name: "  ".to_string(),
            description: None,
            config: None,
        };

        let result = validate_blueprint_request(&req);
        assert!(matches!(result, Err(BlueprintError::ValidationError(_))));
    }

    #[test]
    fn test_validate_config_must_be_object() {
        let req = CreateBlueprint {
            name: "Foo".to_string(),
            description: None,
            config: Some(serde_json::json!([1, 2, 3])),
        };

        let result = validate_blueprint_request(&req);
        assert!(matches!(result, Err(BlueprintError::ValidationError(_))));
    }

    #[test]
    fn test_validate_valid_request() {
        let req = CreateBlueprint {
            name: "Foo".to_string(),
            description: Some("A design".to_string()),
            config: Some(serde_json::json!({"version": 1})),
        };

        assert!(validate_blueprint_request(&req).is_ok());
    }

    #[test]
    fn test_validate_empty_slot_id() {
        let result = validate_upsert_request(&upsert_req(""));
        assert!(matches!(result, Err(BlueprintError::ValidationError(_))));
    }

    #[test]
    fn test_validate_nonpositive_resources() {
        let mut req = upsert_req("svc1");
        req.cpu = Some(0);
        assert!(matches!(
            validate_upsert_request(&req),
            Err(BlueprintError::ValidationError(_))
        ));

        let mut req = upsert_req("svc1");
        req.memory = Some(-1);
        assert!(matches!(
            validate_upsert_request(&req),
            Err(BlueprintError::ValidationError(_))
        ));
    }

    #[test]
    fn test_new_service_defaults() {
        let service = new_service(Uuid::new_v4(), &upsert_req("svc1"));

        assert_eq!(service.slot_id, "svc1");
        assert_eq!(service.name, "New Service");
        assert_eq!(service.cpu, DEFAULT_CPU);
        assert_eq!(service.memory, DEFAULT_MEMORY);
        assert!(service.variables.is_empty());
        assert_eq!(service.networking, Networking::default());
        assert_eq!(service.position, Position::default());
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut service = new_service(Uuid::new_v4(), &upsert_req("svc1"));
        service.name = "api".to_string();
        service.image = Some("nginx:1.27".to_string());
        service.cpu = 4;

        let mut req = upsert_req("svc1");
        req.cpu = Some(16);
        apply_patch(&mut service, &req);

        assert_eq!(service.cpu, 16);
        assert_eq!(service.name, "api");
        assert_eq!(service.image.as_deref(), Some("nginx:1.27"));
    }

    #[test]
    fn test_patch_replaces_variables_wholesale_when_present() {
        let mut service = new_service(Uuid::new_v4(), &upsert_req("svc1"));
        service
            .variables
            .insert("PORT".to_string(), "8080".to_string());

        let mut req = upsert_req("svc1");
        let mut variables = std::collections::HashMap::new();
        variables.insert("HOST".to_string(), "0.0.0.0".to_string());
        req.variables = Some(variables);
        apply_patch(&mut service, &req);

        assert_eq!(service.variables.len(), 1);
        assert_eq!(service.variables["HOST"], "0.0.0.0");
    }
}

//! Deployment Service Repository
//!
//! Handles all database operations for service slots within a deployment.

use drydock_core::domain::deployment::{DeploymentService, ServiceStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Insert a new service slot
///
/// Generic over the executor so promotion can batch inserts in one
/// transaction.
pub async fn insert(
    executor: impl PgExecutor<'_>,
    service: &DeploymentService,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO deployment_services (
            id, deployment_id, source_service_id, slot_id, name, image,
            registry_username, registry_password,
            platform_service_id, platform_deployment_id, cpu, memory,
            variables, networking, position_x, position_y,
            status, public_url, deployed_at, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21)
        "#,
    )
    .bind(service.id)
    .bind(service.deployment_id)
    .bind(service.source_service_id)
    .bind(&service.slot_id)
    .bind(&service.name)
    .bind(&service.image)
    .bind(&service.registry_username)
    .bind(&service.registry_password)
    .bind(&service.platform_service_id)
    .bind(&service.platform_deployment_id)
    .bind(service.cpu)
    .bind(service.memory)
    .bind(serde_json::to_value(&service.variables).unwrap_or_default())
    .bind(serde_json::to_value(service.networking).unwrap_or_default())
    .bind(service.position.x)
    .bind(service.position.y)
    .bind(status_to_string(service.status))
    .bind(&service.public_url)
    .bind(service.deployed_at)
    .bind(service.created_at)
    .bind(service.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Overwrite the mutable fields of an existing slot
///
/// Status, platform identifiers, public_url and deployed_at belong to the
/// reconciler and are deliberately not touched here.
pub async fn update(pool: &PgPool, service: &DeploymentService) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE deployment_services
        SET name = $1, image = $2, registry_username = $3, registry_password = $4,
            cpu = $5, memory = $6, variables = $7, networking = $8,
            position_x = $9, position_y = $10, updated_at = $11
        WHERE deployment_id = $12 AND slot_id = $13
        "#,
    )
    .bind(&service.name)
    .bind(&service.image)
    .bind(&service.registry_username)
    .bind(&service.registry_password)
    .bind(service.cpu)
    .bind(service.memory)
    .bind(serde_json::to_value(&service.variables).unwrap_or_default())
    .bind(serde_json::to_value(service.networking).unwrap_or_default())
    .bind(service.position.x)
    .bind(service.position.y)
    .bind(chrono::Utc::now())
    .bind(service.deployment_id)
    .bind(&service.slot_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Find a slot by its handle within a deployment
pub async fn find_by_slot(
    pool: &PgPool,
    deployment_id: Uuid,
    slot_id: &str,
) -> Result<Option<DeploymentService>, sqlx::Error> {
    let row = sqlx::query_as::<_, DeploymentServiceRow>(
        r#"
        SELECT id, deployment_id, source_service_id, slot_id, name, image,
               registry_username, registry_password,
               platform_service_id, platform_deployment_id, cpu, memory,
               variables, networking, position_x, position_y,
               status, public_url, deployed_at, created_at, updated_at
        FROM deployment_services
        WHERE deployment_id = $1 AND slot_id = $2
        "#,
    )
    .bind(deployment_id)
    .bind(slot_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all slots of a deployment in creation order
pub async fn list_for_deployment(
    pool: &PgPool,
    deployment_id: Uuid,
) -> Result<Vec<DeploymentService>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DeploymentServiceRow>(
        r#"
        SELECT id, deployment_id, source_service_id, slot_id, name, image,
               registry_username, registry_password,
               platform_service_id, platform_deployment_id, cpu, memory,
               variables, networking, position_x, position_y,
               status, public_url, deployed_at, created_at, updated_at
        FROM deployment_services
        WHERE deployment_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(deployment_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete a slot by its handle
pub async fn delete(
    pool: &PgPool,
    deployment_id: Uuid,
    slot_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM deployment_services WHERE deployment_id = $1 AND slot_id = $2",
    )
    .bind(deployment_id)
    .bind(slot_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Write back reconciliation state from the external platform
///
/// Compare-and-swap on the status column: the write only lands if the row
/// still carries `expected`, the status the caller validated against.
/// Returns false when a concurrent report moved the row first.
pub async fn reconcile(
    pool: &PgPool,
    id: Uuid,
    expected: ServiceStatus,
    status: ServiceStatus,
    platform_service_id: Option<&str>,
    platform_deployment_id: Option<&str>,
    public_url: Option<&str>,
    deployed_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE deployment_services
        SET status = $1,
            platform_service_id = COALESCE($2, platform_service_id),
            platform_deployment_id = COALESCE($3, platform_deployment_id),
            public_url = COALESCE($4, public_url),
            deployed_at = COALESCE($5, deployed_at),
            updated_at = $6
        WHERE id = $7 AND status = $8
        "#,
    )
    .bind(status_to_string(status))
    .bind(platform_service_id)
    .bind(platform_deployment_id)
    .bind(public_url)
    .bind(deployed_at)
    .bind(chrono::Utc::now())
    .bind(id)
    .bind(status_to_string(expected))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn status_to_string(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Pending => "pending",
        ServiceStatus::Building => "building",
        ServiceStatus::Deploying => "deploying",
        ServiceStatus::Running => "running",
        ServiceStatus::Failed => "failed",
        ServiceStatus::Stopped => "stopped",
    }
}

fn string_to_status(s: &str) -> ServiceStatus {
    match s {
        "pending" => ServiceStatus::Pending,
        "building" => ServiceStatus::Building,
        "deploying" => ServiceStatus::Deploying,
        "running" => ServiceStatus::Running,
        "failed" => ServiceStatus::Failed,
        "stopped" => ServiceStatus::Stopped,
        _ => ServiceStatus::Pending,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DeploymentServiceRow {
    id: Uuid,
    deployment_id: Uuid,
    source_service_id: Option<Uuid>,
    slot_id: String,
    name: String,
    image: Option<String>,
    registry_username: Option<String>,
    registry_password: Option<String>,
    platform_service_id: Option<String>,
    platform_deployment_id: Option<String>,
    cpu: i32,
    memory: i32,
    variables: serde_json::Value,
    networking: serde_json::Value,
    position_x: f64,
    position_y: f64,
    status: String,
    public_url: Option<String>,
    deployed_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<DeploymentServiceRow> for DeploymentService {
    fn from(row: DeploymentServiceRow) -> Self {
        let variables = serde_json::from_value(row.variables).unwrap_or_default();
        let networking = serde_json::from_value(row.networking).unwrap_or_default();
        let status = string_to_status(&row.status);

        DeploymentService {
            id: row.id,
            deployment_id: row.deployment_id,
            source_service_id: row.source_service_id,
            slot_id: row.slot_id,
            name: row.name,
            image: row.image,
            registry_username: row.registry_username,
            registry_password: row.registry_password,
            platform_service_id: row.platform_service_id,
            platform_deployment_id: row.platform_deployment_id,
            cpu: row.cpu,
            memory: row.memory,
            variables,
            networking,
            position: drydock_core::domain::Position {
                x: row.position_x,
                y: row.position_y,
            },
            status,
            public_url: row.public_url,
            deployed_at: row.deployed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

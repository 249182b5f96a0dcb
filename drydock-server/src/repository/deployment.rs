//! Deployment Repository
//!
//! Handles all database operations related to deployments, including the
//! promotion transaction that snapshots a blueprint into a new deployment.

use drydock_core::domain::deployment::{Deployment, DeploymentService, DeploymentStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::repository::deployment_service_repository;

/// Insert a new deployment
///
/// Generic over the executor so it can run standalone or inside the
/// promotion transaction.
pub async fn insert(
    executor: impl PgExecutor<'_>,
    deployment: &Deployment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO deployments (
            id, owner_id, source_blueprint_id, name, description,
            platform_project_id, platform_environment_id, status,
            is_active, deployed_at, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(deployment.id)
    .bind(deployment.owner_id)
    .bind(deployment.source_blueprint_id)
    .bind(&deployment.name)
    .bind(&deployment.description)
    .bind(&deployment.platform_project_id)
    .bind(&deployment.platform_environment_id)
    .bind(status_to_string(deployment.status))
    .bind(deployment.is_active)
    .bind(deployment.deployed_at)
    .bind(deployment.created_at)
    .bind(deployment.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Atomically materialize a promotion: the new deployment, all of its
/// service copies, and the publish flag on the source blueprint commit
/// together or not at all.
pub async fn create_promoted(
    pool: &PgPool,
    blueprint_id: Uuid,
    deployment: &Deployment,
    services: &[DeploymentService],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    insert(&mut *tx, deployment).await?;

    for service in services {
        deployment_service_repository::insert(&mut *tx, service).await?;
    }

    sqlx::query(
        r#"
        UPDATE blueprints
        SET is_published = TRUE, updated_at = $1
        WHERE id = $2
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(blueprint_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Find an active deployment by ID, scoped to its owner
pub async fn find_by_id(
    pool: &PgPool,
    owner_id: Uuid,
    id: Uuid,
) -> Result<Option<Deployment>, sqlx::Error> {
    let row = sqlx::query_as::<_, DeploymentRow>(
        r#"
        SELECT id, owner_id, source_blueprint_id, name, description,
               platform_project_id, platform_environment_id, status,
               is_active, deployed_at, created_at, updated_at
        FROM deployments
        WHERE id = $1 AND owner_id = $2 AND is_active
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List an owner's active deployments with their live service counts
pub async fn list_active(
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<Vec<(Deployment, i64)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DeploymentWithCountRow>(
        r#"
        SELECT d.id, d.owner_id, d.source_blueprint_id, d.name, d.description,
               d.platform_project_id, d.platform_environment_id, d.status,
               d.is_active, d.deployed_at, d.created_at, d.updated_at,
               COUNT(s.id) AS services_count
        FROM deployments d
        LEFT JOIN deployment_services s ON s.deployment_id = d.id
        WHERE d.owner_id = $1 AND d.is_active
        GROUP BY d.id
        ORDER BY d.created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let count = r.services_count;
            (r.deployment.into(), count)
        })
        .collect())
}

/// Names of an owner's active deployments, for display-name generation
pub async fn list_active_names(pool: &PgPool, owner_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT name FROM deployments WHERE owner_id = $1 AND is_active",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// Archive a deployment (deactivate only; service rows are kept as history)
pub async fn archive(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE deployments
        SET is_active = FALSE, updated_at = $1
        WHERE id = $2 AND owner_id = $3 AND is_active
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(id)
    .bind(owner_id)
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
    expected: DeploymentStatus,
    status: DeploymentStatus,
    platform_project_id: Option<&str>,
    platform_environment_id: Option<&str>,
    deployed_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE deployments
        SET status = $1,
            platform_project_id = COALESCE($2, platform_project_id),
            platform_environment_id = COALESCE($3, platform_environment_id),
            deployed_at = COALESCE($4, deployed_at),
            updated_at = $5
        WHERE id = $6 AND status = $7
        "#,
    )
    .bind(status_to_string(status))
    .bind(platform_project_id)
    .bind(platform_environment_id)
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

fn status_to_string(status: DeploymentStatus) -> &'static str {
    match status {
        DeploymentStatus::Draft => "draft",
        DeploymentStatus::Deploying => "deploying",
        DeploymentStatus::Deployed => "deployed",
        DeploymentStatus::Failed => "failed",
        DeploymentStatus::Stopped => "stopped",
    }
}

fn string_to_status(s: &str) -> DeploymentStatus {
    match s {
        "draft" => DeploymentStatus::Draft,
        "deploying" => DeploymentStatus::Deploying,
        "deployed" => DeploymentStatus::Deployed,
        "failed" => DeploymentStatus::Failed,
        "stopped" => DeploymentStatus::Stopped,
        _ => DeploymentStatus::Draft,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DeploymentRow {
    id: Uuid,
    owner_id: Uuid,
    source_blueprint_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    platform_project_id: Option<String>,
    platform_environment_id: Option<String>,
    status: String,
    is_active: bool,
    deployed_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct DeploymentWithCountRow {
    #[sqlx(flatten)]
    deployment: DeploymentRow,
    services_count: i64,
}

impl From<DeploymentRow> for Deployment {
    fn from(row: DeploymentRow) -> Self {
        let status = string_to_status(&row.status);

        Deployment {
            id: row.id,
            owner_id: row.owner_id,
            source_blueprint_id: row.source_blueprint_id,
            name: row.name,
            description: row.description,
            platform_project_id: row.platform_project_id,
            platform_environment_id: row.platform_environment_id,
            status,
            is_active: row.is_active,
            deployed_at: row.deployed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

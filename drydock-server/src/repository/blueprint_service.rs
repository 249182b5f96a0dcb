//! Blueprint Service Repository
//!
//! Handles all database operations for service slots within a blueprint.
//! Slots are addressed by (blueprint_id, slot_id); ownership checks happen
//! one level up, when the owning blueprint is fetched.

use drydock_core::domain::blueprint::BlueprintService;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new service slot
pub async fn insert(pool: &PgPool, service: &BlueprintService) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO blueprint_services (
            id, blueprint_id, slot_id, name, image,
            registry_username, registry_password, cpu, memory,
            variables, networking, position_x, position_y,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(service.id)
    .bind(service.blueprint_id)
    .bind(&service.slot_id)
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
    .bind(service.created_at)
    .bind(service.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite an existing slot with the given state
pub async fn update(pool: &PgPool, service: &BlueprintService) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE blueprint_services
        SET name = $1, image = $2, registry_username = $3, registry_password = $4,
            cpu = $5, memory = $6, variables = $7, networking = $8,
            position_x = $9, position_y = $10, updated_at = $11
        WHERE blueprint_id = $12 AND slot_id = $13
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
    .bind(service.blueprint_id)
    .bind(&service.slot_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Find a slot by its handle within a blueprint
pub async fn find_by_slot(
    pool: &PgPool,
    blueprint_id: Uuid,
    slot_id: &str,
) -> Result<Option<BlueprintService>, sqlx::Error> {
    let row = sqlx::query_as::<_, BlueprintServiceRow>(
        r#"
        SELECT id, blueprint_id, slot_id, name, image,
               registry_username, registry_password, cpu, memory,
               variables, networking, position_x, position_y,
               created_at, updated_at
        FROM blueprint_services
        WHERE blueprint_id = $1 AND slot_id = $2
        "#,
    )
    .bind(blueprint_id)
    .bind(slot_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all slots of a blueprint in creation order
pub async fn list_for_blueprint(
    pool: &PgPool,
    blueprint_id: Uuid,
) -> Result<Vec<BlueprintService>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BlueprintServiceRow>(
        r#"
        SELECT id, blueprint_id, slot_id, name, image,
               registry_username, registry_password, cpu, memory,
               variables, networking, position_x, position_y,
               created_at, updated_at
        FROM blueprint_services
        WHERE blueprint_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(blueprint_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete a slot by its handle
pub async fn delete(pool: &PgPool, blueprint_id: Uuid, slot_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM blueprint_services WHERE blueprint_id = $1 AND slot_id = $2",
    )
    .bind(blueprint_id)
    .bind(slot_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BlueprintServiceRow {
    id: Uuid,
    blueprint_id: Uuid,
    slot_id: String,
    name: String,
    image: Option<String>,
    registry_username: Option<String>,
    registry_password: Option<String>,
    cpu: i32,
    memory: i32,
    variables: serde_json::Value,
    networking: serde_json::Value,
    position_x: f64,
    position_y: f64,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<BlueprintServiceRow> for BlueprintService {
    fn from(row: BlueprintServiceRow) -> Self {
        let variables = serde_json::from_value(row.variables).unwrap_or_default();
        let networking = serde_json::from_value(row.networking).unwrap_or_default();

        BlueprintService {
            id: row.id,
            blueprint_id: row.blueprint_id,
            slot_id: row.slot_id,
            name: row.name,
            image: row.image,
            registry_username: row.registry_username,
            registry_password: row.registry_password,
            cpu: row.cpu,
            memory: row.memory,
            variables,
            networking,
            position: drydock_core::domain::Position {
                x: row.position_x,
                y: row.position_y,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

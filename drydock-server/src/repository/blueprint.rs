//! Blueprint Repository
//!
//! Handles all database operations related to blueprints. Every lookup is
//! scoped by owner; rows belonging to other owners are invisible.

use drydock_core::domain::blueprint::Blueprint;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new blueprint
pub async fn create(pool: &PgPool, blueprint: &Blueprint) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO blueprints (
            id, owner_id, name, description, config,
            is_active, is_published, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(blueprint.id)
    .bind(blueprint.owner_id)
    .bind(&blueprint.name)
    .bind(&blueprint.description)
    .bind(&blueprint.config)
    .bind(blueprint.is_active)
    .bind(blueprint.is_published)
    .bind(blueprint.created_at)
    .bind(blueprint.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Find an active blueprint by ID, scoped to its owner
pub async fn find_by_id(
    pool: &PgPool,
    owner_id: Uuid,
    id: Uuid,
) -> Result<Option<Blueprint>, sqlx::Error> {
    let row = sqlx::query_as::<_, BlueprintRow>(
        r#"
        SELECT id, owner_id, name, description, config,
               is_active, is_published, created_at, updated_at
        FROM blueprints
        WHERE id = $1 AND owner_id = $2 AND is_active
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List an owner's active blueprints with their live service counts
pub async fn list_active(
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<Vec<(Blueprint, i64)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BlueprintWithCountRow>(
        r#"
        SELECT b.id, b.owner_id, b.name, b.description, b.config,
               b.is_active, b.is_published, b.created_at, b.updated_at,
               COUNT(s.id) AS services_count
        FROM blueprints b
        LEFT JOIN blueprint_services s ON s.blueprint_id = b.id
        WHERE b.owner_id = $1 AND b.is_active
        GROUP BY b.id
        ORDER BY b.created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let count = r.services_count;
            (r.blueprint.into(), count)
        })
        .collect())
}

/// Archive a blueprint: deactivate the row and purge its service slots
/// in one transaction.
pub async fn archive(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE blueprints
        SET is_active = FALSE, updated_at = $1
        WHERE id = $2 AND owner_id = $3 AND is_active
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(id)
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("DELETE FROM blueprint_services WHERE blueprint_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BlueprintRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    config: serde_json::Value,
    is_active: bool,
    is_published: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct BlueprintWithCountRow {
    #[sqlx(flatten)]
    blueprint: BlueprintRow,
    services_count: i64,
}

impl From<BlueprintRow> for Blueprint {
    fn from(row: BlueprintRow) -> Self {
        Blueprint {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            config: row.config,
            is_active: row.is_active,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

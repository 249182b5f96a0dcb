use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create blueprints table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blueprints (
            id UUID PRIMARY KEY,
            owner_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            description TEXT,
            config JSONB NOT NULL DEFAULT '{}',
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            is_published BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create blueprint_services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blueprint_services (
            id UUID PRIMARY KEY,
            blueprint_id UUID NOT NULL REFERENCES blueprints(id) ON DELETE CASCADE,
            slot_id VARCHAR(255) NOT NULL,
            name VARCHAR(255) NOT NULL,
            image VARCHAR(500),
            registry_username VARCHAR(255),
            registry_password VARCHAR(500),
            cpu INTEGER NOT NULL DEFAULT 8,
            memory INTEGER NOT NULL DEFAULT 8,
            variables JSONB NOT NULL DEFAULT '{}',
            networking JSONB NOT NULL DEFAULT '{}',
            position_x DOUBLE PRECISION NOT NULL DEFAULT 0,
            position_y DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            UNIQUE (blueprint_id, slot_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create deployments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deployments (
            id UUID PRIMARY KEY,
            owner_id UUID NOT NULL,
            source_blueprint_id UUID REFERENCES blueprints(id) ON DELETE SET NULL,
            name VARCHAR(255) NOT NULL,
            description TEXT,
            platform_project_id VARCHAR(255),
            platform_environment_id VARCHAR(255),
            status VARCHAR(20) NOT NULL DEFAULT 'draft',
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            deployed_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create deployment_services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deployment_services (
            id UUID PRIMARY KEY,
            deployment_id UUID NOT NULL REFERENCES deployments(id) ON DELETE CASCADE,
            source_service_id UUID REFERENCES blueprint_services(id) ON DELETE SET NULL,
            slot_id VARCHAR(255) NOT NULL,
            name VARCHAR(255) NOT NULL,
            image VARCHAR(500),
            registry_username VARCHAR(255),
            registry_password VARCHAR(500),
            platform_service_id VARCHAR(255),
            platform_deployment_id VARCHAR(255),
            cpu INTEGER NOT NULL DEFAULT 8,
            memory INTEGER NOT NULL DEFAULT 8,
            variables JSONB NOT NULL DEFAULT '{}',
            networking JSONB NOT NULL DEFAULT '{}',
            position_x DOUBLE PRECISION NOT NULL DEFAULT 0,
            position_y DOUBLE PRECISION NOT NULL DEFAULT 0,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            public_url VARCHAR(500),
            deployed_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            UNIQUE (deployment_id, slot_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Active names are unique per owner; archived rows free the name up again
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_blueprints_owner_active_name \
         ON blueprints(owner_id, name) WHERE is_active",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_deployments_owner_active_name \
         ON deployments(owner_id, name) WHERE is_active",
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_blueprints_owner_id ON blueprints(owner_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_deployments_owner_id ON deployments(owner_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_blueprint_services_blueprint_id \
         ON blueprint_services(blueprint_id, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_deployment_services_deployment_id \
         ON deployment_services(deployment_id, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_deployments_status ON deployments(status)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

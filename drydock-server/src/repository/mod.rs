//! Repository Module
//!
//! Data access layer for the server.
//! Each repository handles database operations for a specific domain entity.

pub mod blueprint;
pub mod blueprint_service;
pub mod deployment;
pub mod deployment_service;

// Re-export for convenience
pub use blueprint as blueprint_repository;
pub use blueprint_service as blueprint_service_repository;
pub use deployment as deployment_repository;
pub use deployment_service as deployment_service_repository;

/// Whether a database error is a Postgres unique-constraint violation.
///
/// Upsert create/create races and duplicate active names both surface as
/// code 23505; callers either retry as an update or report a conflict.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

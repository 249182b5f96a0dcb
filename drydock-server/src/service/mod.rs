//! Service Module
//!
//! Business logic layer for the server.
//! Services orchestrate between repositories and contain domain logic.

pub mod blueprint;
pub mod deployment;
pub mod promotion;

// Re-export for convenience
pub use blueprint as blueprint_service;
pub use deployment as deployment_service;
pub use promotion as promotion_service;

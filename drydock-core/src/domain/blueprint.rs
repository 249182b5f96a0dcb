//! Blueprint domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Networking, Position};

/// Editable multi-service design graph
///
/// A blueprint is never deployed itself; promotion snapshots it into an
/// independent [`Deployment`](crate::domain::deployment::Deployment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Opaque structured configuration document (always a JSON object)
    pub config: serde_json::Value,
    /// Soft-delete flag; archived blueprints are invisible to every lookup
    pub is_active: bool,
    /// Set on first successful promotion, never cleared
    pub is_published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// One container slot within a blueprint
///
/// `slot_id` is the stable handle the editor UI addresses; it is unique
/// within the owning blueprint, never globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintService {
    pub id: Uuid,
    pub blueprint_id: Uuid,
    pub slot_id: String,
    pub name: String,
    /// Registry path with optional tag, e.g. "ghcr.io/acme/api:1.2"
    pub image: Option<String>,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
    pub cpu: i32,
    pub memory: i32,
    pub variables: HashMap<String, String>,
    pub networking: Networking,
    pub position: Position,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

//! Blueprint DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Networking, Position};

/// Request to create a new blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlueprint {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Structured configuration document; must be a JSON object when present
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// Summary of a blueprint for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_published: bool,
    /// Live count of service slots, derived at query time
    pub services_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Upsert request for a blueprint service slot
///
/// Patch semantics: on an existing slot only the fields present in the
/// request are applied; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertBlueprintService {
    /// Slot handle, unique within the owning blueprint
    pub service_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub registry_username: Option<String>,
    #[serde(default)]
    pub registry_password: Option<String>,
    #[serde(default)]
    pub cpu: Option<i32>,
    #[serde(default)]
    pub memory: Option<i32>,
    #[serde(default)]
    pub variables: Option<HashMap<String, String>>,
    #[serde(default)]
    pub networking: Option<Networking>,
    #[serde(default)]
    pub position: Option<Position>,
}

//! Deployment DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::deployment::{DeploymentStatus, ServiceStatus};
use crate::domain::{Networking, Position};

/// Request to create a deployment directly, without a source blueprint
///
/// The display name is generated server-side from the owner's active names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDeployment {
    #[serde(default)]
    pub description: Option<String>,
}

/// Summary of a deployment for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: DeploymentStatus,
    pub source_blueprint_id: Option<Uuid>,
    /// Live count of service slots, derived at query time
    pub services_count: i64,
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Upsert request for a deployment service slot
///
/// Replace semantics: on an existing slot every mutable field (name, image,
/// cpu, memory, variables, networking, position) is overwritten in one call.
/// Status and platform identifiers are never editable through this path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertDeploymentService {
    /// Slot handle, unique within the owning deployment
    pub service_id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub registry_username: Option<String>,
    #[serde(default)]
    pub registry_password: Option<String>,
    pub cpu: i32,
    pub memory: i32,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub networking: Networking,
    #[serde(default)]
    pub position: Position,
}

/// Status write-back for a deployment, sent by the reconciliation boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileDeployment {
    pub status: DeploymentStatus,
    #[serde(default)]
    pub platform_project_id: Option<String>,
    #[serde(default)]
    pub platform_environment_id: Option<String>,
    #[serde(default)]
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Status write-back for a deployed service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileService {
    pub status: ServiceStatus,
    #[serde(default)]
    pub platform_service_id: Option<String>,
    #[serde(default)]
    pub platform_deployment_id: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
}

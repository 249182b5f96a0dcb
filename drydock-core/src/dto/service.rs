//! Wire-safe service projections
//!
//! The editor UI consumes one shape for both blueprint and deployment slots.
//! Registry secrets never leave the server: the projection carries only a
//! `has_credentials` flag and the plaintext username.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::blueprint::BlueprintService;
use crate::domain::deployment::{DeploymentService, ServiceStatus};
use crate::domain::{Networking, Position};

/// Service slot as seen by the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceView {
    pub id: Uuid,
    /// Slot handle within the owning graph
    pub service_id: String,
    pub name: String,
    pub image: Option<String>,
    pub cpu: i32,
    pub memory: i32,
    pub variables: HashMap<String, String>,
    pub networking: Networking,
    pub position: Position,
    pub has_credentials: bool,
    pub registry_username: Option<String>,
}

impl From<BlueprintService> for ServiceView {
    fn from(service: BlueprintService) -> Self {
        ServiceView {
            id: service.id,
            service_id: service.slot_id,
            name: service.name,
            image: service.image,
            cpu: service.cpu,
            memory: service.memory,
            variables: service.variables,
            networking: service.networking,
            position: service.position,
            has_credentials: service.registry_password.is_some(),
            registry_username: service.registry_username,
        }
    }
}

/// Deployment slot projection: the shared shape plus runtime state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentServiceView {
    #[serde(flatten)]
    pub service: ServiceView,
    pub status: ServiceStatus,
    pub public_url: Option<String>,
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<DeploymentService> for DeploymentServiceView {
    fn from(service: DeploymentService) -> Self {
        DeploymentServiceView {
            status: service.status,
            public_url: service.public_url.clone(),
            deployed_at: service.deployed_at,
            service: ServiceView {
                id: service.id,
                service_id: service.slot_id,
                name: service.name,
                image: service.image,
                cpu: service.cpu,
                memory: service.memory,
                variables: service.variables,
                networking: service.networking,
                position: service.position,
                has_credentials: service.registry_password.is_some(),
                registry_username: service.registry_username,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_service() -> BlueprintService {
        let now = chrono::Utc::now();
        BlueprintService {
            id: Uuid::new_v4(),
            blueprint_id: Uuid::new_v4(),
            slot_id: "svc1".to_string(),
            name: "api".to_string(),
            image: Some("nginx:latest".to_string()),
            registry_username: Some("acme".to_string()),
            registry_password: Some("s3cret".to_string()),
            cpu: 8,
            memory: 8,
            variables: HashMap::new(),
            networking: Networking::default(),
            position: Position::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_secret_never_serialized() {
        let view = ServiceView::from(sample_service());
        let json = serde_json::to_string(&view).unwrap();

        assert!(!json.contains("registry_password"));
        assert!(!json.contains("s3cret"));
        assert!(json.contains("\"has_credentials\":true"));
        assert!(json.contains("\"registry_username\":\"acme\""));
    }

    #[test]
    fn test_has_credentials_false_without_secret() {
        let mut service = sample_service();
        service.registry_password = None;
        service.registry_username = None;

        let view = ServiceView::from(service);
        assert!(!view.has_credentials);
        assert!(view.registry_username.is_none());
    }

    #[test]
    fn test_slot_id_exposed_as_service_id() {
        let view = ServiceView::from(sample_service());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["service_id"], "svc1");
    }
}

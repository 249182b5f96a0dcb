//! Deployment domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::blueprint::{Blueprint, BlueprintService};
use crate::domain::{Networking, Position};

/// Status of a deployment, driven by the reconciliation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Draft,
    Deploying,
    Deployed,
    Failed,
    Stopped,
}

impl DeploymentStatus {
    /// Whether moving to `next` is a valid forward transition.
    ///
    /// Reporting the current status again is accepted so the reconciler can
    /// retry idempotently; backward transitions are rejected.
    pub fn can_transition_to(self, next: DeploymentStatus) -> bool {
        use DeploymentStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Draft, Deploying)
                | (Deploying, Deployed)
                | (Deploying, Failed)
                | (Deployed, Stopped)
                | (Failed, Deploying)
                | (Stopped, Deploying)
        )
    }
}

/// Status of a single deployed service, driven by the reconciliation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Pending,
    Building,
    Deploying,
    Running,
    Failed,
    Stopped,
}

impl ServiceStatus {
    /// Whether moving to `next` is a valid forward transition.
    pub fn can_transition_to(self, next: ServiceStatus) -> bool {
        use ServiceStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Building)
                | (Pending, Failed)
                | (Building, Deploying)
                | (Building, Failed)
                | (Deploying, Running)
                | (Deploying, Failed)
                | (Running, Stopped)
                | (Running, Failed)
                | (Failed, Building)
                | (Stopped, Building)
        )
    }
}

/// Concrete, status-tracked instantiation of a blueprint (or created directly)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Blueprint this deployment was promoted from, if any
    pub source_blueprint_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    /// External platform identifiers, filled in by the reconciler
    pub platform_project_id: Option<String>,
    pub platform_environment_id: Option<String>,
    pub status: DeploymentStatus,
    pub is_active: bool,
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Deployment {
    /// Build the deployment record a promotion creates from `blueprint`.
    ///
    /// Fresh identity, draft status, provenance pointing back at the source.
    pub fn promoted_from(blueprint: &Blueprint) -> Deployment {
        let now = chrono::Utc::now();
        Deployment {
            id: Uuid::new_v4(),
            owner_id: blueprint.owner_id,
            source_blueprint_id: Some(blueprint.id),
            name: format!("{} Deployment", blueprint.name),
            description: Some(format!("Deployed from blueprint: {}", blueprint.name)),
            platform_project_id: None,
            platform_environment_id: None,
            status: DeploymentStatus::Draft,
            is_active: true,
            deployed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One container slot within a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentService {
    pub id: Uuid,
    pub deployment_id: Uuid,
    /// Blueprint service this slot was copied from, if any
    pub source_service_id: Option<Uuid>,
    pub slot_id: String,
    pub name: String,
    pub image: Option<String>,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
    /// External platform identifiers, filled in by the reconciler
    pub platform_service_id: Option<String>,
    pub platform_deployment_id: Option<String>,
    pub cpu: i32,
    pub memory: i32,
    pub variables: HashMap<String, String>,
    pub networking: Networking,
    pub position: Position,
    pub status: ServiceStatus,
    pub public_url: Option<String>,
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl DeploymentService {
    /// Deep-copy a blueprint service into a slot of `deployment_id`.
    ///
    /// Every configuration field is copied by value; mutating the copy must
    /// never affect the blueprint-side original.
    pub fn promoted_from(service: &BlueprintService, deployment_id: Uuid) -> DeploymentService {
        let now = chrono::Utc::now();
        DeploymentService {
            id: Uuid::new_v4(),
            deployment_id,
            source_service_id: Some(service.id),
            slot_id: service.slot_id.clone(),
            name: service.name.clone(),
            image: service.image.clone(),
            registry_username: service.registry_username.clone(),
            registry_password: service.registry_password.clone(),
            platform_service_id: None,
            platform_deployment_id: None,
            cpu: service.cpu,
            memory: service.memory,
            variables: service.variables.clone(),
            networking: service.networking,
            position: service.position,
            status: ServiceStatus::Pending,
            public_url: None,
            deployed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy an entire blueprint service list into slots of `deployment_id`,
    /// preserving order. One copy per source, nothing skipped.
    pub fn promote_all(
        sources: &[BlueprintService],
        deployment_id: Uuid,
    ) -> Vec<DeploymentService> {
        sources
            .iter()
            .map(|source| DeploymentService::promoted_from(source, deployment_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_blueprint() -> Blueprint {
        let now = chrono::Utc::now();
        Blueprint {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Foo".to_string(),
            description: None,
            config: serde_json::json!({}),
            is_active: true,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_service(blueprint_id: Uuid) -> BlueprintService {
        let now = chrono::Utc::now();
        let mut variables = HashMap::new();
        variables.insert("PORT".to_string(), "8080".to_string());
        BlueprintService {
            id: Uuid::new_v4(),
            blueprint_id,
            slot_id: "svc1".to_string(),
            name: "api".to_string(),
            image: Some("ghcr.io/acme/api:1.2".to_string()),
            registry_username: Some("acme".to_string()),
            registry_password: Some("hunter2".to_string()),
            cpu: 8,
            memory: 8,
            variables,
            networking: Networking {
                http: true,
                tcp: false,
            },
            position: Position { x: 12.5, y: -3.0 },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_promoted_deployment_draft_with_provenance() {
        let blueprint = sample_blueprint();
        let deployment = Deployment::promoted_from(&blueprint);

        assert_eq!(deployment.name, "Foo Deployment");
        assert_eq!(deployment.status, DeploymentStatus::Draft);
        assert_eq!(deployment.owner_id, blueprint.owner_id);
        assert_eq!(deployment.source_blueprint_id, Some(blueprint.id));
        assert!(deployment.deployed_at.is_none());
        assert!(deployment.platform_project_id.is_none());
    }

    #[test]
    fn test_promoted_service_copies_every_field() {
        let blueprint = sample_blueprint();
        let source = sample_service(blueprint.id);
        let deployment_id = Uuid::new_v4();
        let copy = DeploymentService::promoted_from(&source, deployment_id);

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.deployment_id, deployment_id);
        assert_eq!(copy.source_service_id, Some(source.id));
        assert_eq!(copy.slot_id, source.slot_id);
        assert_eq!(copy.name, source.name);
        assert_eq!(copy.image, source.image);
        assert_eq!(copy.registry_username, source.registry_username);
        assert_eq!(copy.registry_password, source.registry_password);
        assert_eq!(copy.cpu, source.cpu);
        assert_eq!(copy.memory, source.memory);
        assert_eq!(copy.variables, source.variables);
        assert_eq!(copy.networking, source.networking);
        assert_eq!(copy.position, source.position);
        assert_eq!(copy.status, ServiceStatus::Pending);
        assert!(copy.platform_service_id.is_none());
        assert!(copy.public_url.is_none());
    }

    #[test]
    fn test_promoted_service_is_a_deep_copy() {
        let blueprint = sample_blueprint();
        let source = sample_service(blueprint.id);
        let mut copy = DeploymentService::promoted_from(&source, Uuid::new_v4());

        copy.cpu = 16;
        copy.variables
            .insert("PORT".to_string(), "9090".to_string());

        assert_eq!(source.cpu, 8);
        assert_eq!(source.variables["PORT"], "8080");
    }

    #[test]
    fn test_double_promotion_yields_independent_copies() {
        let blueprint = sample_blueprint();
        let source = sample_service(blueprint.id);

        let first = DeploymentService::promoted_from(&source, Uuid::new_v4());
        let second = DeploymentService::promoted_from(&source, Uuid::new_v4());

        assert_ne!(first.id, second.id);
        assert_ne!(first.deployment_id, second.deployment_id);
        assert_eq!(first.source_service_id, second.source_service_id);
        assert_eq!(first.slot_id, second.slot_id);
    }

    #[test]
    fn test_promote_all_copies_every_service_in_order() {
        let blueprint = sample_blueprint();
        let sources: Vec<BlueprintService> = (0..3)
            .map(|i| {
                let mut service = sample_service(blueprint.id);
                service.slot_id = format!("svc{}", i + 1);
                service.name = format!("service-{}", i + 1);
                service.cpu = 4 * (i + 1);
                service
            })
            .collect();

        let deployment_id = Uuid::new_v4();
        let copies = DeploymentService::promote_all(&sources, deployment_id);

        assert_eq!(copies.len(), sources.len());
        for (copy, source) in copies.iter().zip(&sources) {
            assert_eq!(copy.deployment_id, deployment_id);
            assert_eq!(copy.source_service_id, Some(source.id));
            assert_eq!(copy.slot_id, source.slot_id);
            assert_eq!(copy.name, source.name);
            assert_eq!(copy.cpu, source.cpu);
            assert_eq!(copy.memory, source.memory);
            assert_eq!(copy.variables, source.variables);
            assert_eq!(copy.status, ServiceStatus::Pending);
        }
    }

    #[test]
    fn test_deployment_status_forward_transitions() {
        use DeploymentStatus::*;
        assert!(Draft.can_transition_to(Deploying));
        assert!(Deploying.can_transition_to(Deployed));
        assert!(Deploying.can_transition_to(Failed));
        assert!(Deployed.can_transition_to(Stopped));
        assert!(Failed.can_transition_to(Deploying));
        assert!(Stopped.can_transition_to(Deploying));
    }

    #[test]
    fn test_deployment_status_rejects_backward_transitions() {
        use DeploymentStatus::*;
        assert!(!Deployed.can_transition_to(Draft));
        assert!(!Deployed.can_transition_to(Deploying));
        assert!(!Deploying.can_transition_to(Draft));
        assert!(!Stopped.can_transition_to(Draft));
    }

    #[test]
    fn test_service_status_forward_transitions() {
        use ServiceStatus::*;
        assert!(Pending.can_transition_to(Building));
        assert!(Building.can_transition_to(Deploying));
        assert!(Deploying.can_transition_to(Running));
        assert!(Running.can_transition_to(Stopped));
        assert!(Failed.can_transition_to(Building));
    }

    #[test]
    fn test_service_status_rejects_backward_transitions() {
        use ServiceStatus::*;
        assert!(!Running.can_transition_to(Deploying));
        assert!(!Running.can_transition_to(Pending));
        assert!(!Deploying.can_transition_to(Building));
        assert!(!Building.can_transition_to(Pending));
    }

    #[test]
    fn test_stale_report_after_concurrent_advance_is_rejected() {
        use ServiceStatus::*;
        // Two reconcilers both read `building`; one advances the slot all the
        // way to `running`. The other's report must be re-validated against
        // the fresh status, where it is now backward.
        let fresh = Running;
        let stale_report = Deploying;
        assert!(Building.can_transition_to(stale_report));
        assert!(!fresh.can_transition_to(stale_report));
    }

    #[test]
    fn test_same_status_is_accepted_as_noop() {
        assert!(DeploymentStatus::Deploying.can_transition_to(DeploymentStatus::Deploying));
        assert!(ServiceStatus::Running.can_transition_to(ServiceStatus::Running));
    }
}

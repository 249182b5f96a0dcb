//! Core domain types
//!
//! This module contains the core domain structures used across Drydock.
//! Blueprints are the user-authored, editable design graphs; deployments are
//! the status-tracked instantiations created from them (or from scratch).

pub mod blueprint;
pub mod deployment;

use serde::{Deserialize, Serialize};

/// Default CPU allocation for a new service slot
pub const DEFAULT_CPU: i32 = 8;
/// Default memory allocation (GB) for a new service slot
pub const DEFAULT_MEMORY: i32 = 8;

/// Networking flags for a service slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Networking {
    #[serde(default)]
    pub http: bool,
    #[serde(default)]
    pub tcp: bool,
}

/// Canvas position of a service slot (UI layout only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

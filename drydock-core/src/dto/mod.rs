//! Data Transfer Objects for the HTTP boundary
//!
//! This module contains the request and response shapes exchanged with the
//! dashboard UI and the reconciliation collaborator. DTOs are lightweight
//! projections of domain entities; notably, the service wire shape never
//! carries the raw registry secret.

pub mod blueprint;
pub mod deployment;
pub mod service;

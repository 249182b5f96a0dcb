//! Drydock Core
//!
//! Core types and abstractions for the Drydock deployment designer.
//!
//! This crate contains:
//! - Domain types: Core business entities (Blueprint, Deployment, etc.)
//! - DTOs: Data transfer objects for the HTTP boundary
//! - Name generation for display names of directly created deployments

pub mod domain;
pub mod dto;
pub mod namegen;

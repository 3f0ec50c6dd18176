//! # API Shared
//!
//! Shared definitions for the healthcare REST API and its clients.
//!
//! Contains:
//! - Boundary types that both sides of the wire agree on (`HealthRes`, `ErrorBody`)
//! - Shared services like `HealthService`
//! - The versioned path prefix
//!
//! Used by `api-rest` (server) and `hc-agent` (client).

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::{ErrorBody, HealthRes};

/// Path prefix every REST endpoint is mounted under.
pub const API_PREFIX: &str = "/api/v2";

/// API version reported by the health endpoint.
pub const API_VERSION: &str = "v2";

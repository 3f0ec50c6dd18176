//! # Healthcare Core
//!
//! Core business logic for the healthcare records API.
//!
//! This crate contains the schema, validation and persistence layers:
//! - Entity models for organizations, patients, practitioners, encounters, conditions and
//!   observations
//! - Structural validation of create/update payloads
//! - One persistence service per entity over a shared SQLite pool (sqlx)
//! - Import of Synthea FHIR bundles through those services
//!
//! **No API concerns**: HTTP routing, JSON error bodies and OpenAPI belong in `api-rest`;
//! tool-calling and the LLM loop belong in `hc-agent`.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod repositories;
pub mod validation;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use import::{ImportSummary, Importer};
pub use models::EntityKind;
pub use repositories::{
    ConditionService, EncounterService, ObservationService, OrganizationService, PatientService,
    PractitionerService, Services,
};

//! FHIR wire/boundary support for the healthcare importer.
//!
//! This crate provides **wire models** and **extraction helpers** for FHIR R4 JSON:
//! - `Bundle` documents as emitted by Synthea (one bundle per synthetic patient)
//! - the six resource types the schema stores, with every other resource kept as `Other`
//!
//! This crate focuses on:
//! - lenient deserialisation (unknown fields ignored, every field optional)
//! - resolving references (`urn:uuid:...`, `Type/id`, `Type?identifier=system|value`)
//! - small accessors for the shapes FHIR nests values in (first coding, telecom by system)
//!
//! It knows nothing about the database; mapping to rows lives in the core importer.

pub mod bundle;
pub mod datatypes;
pub mod resources;

pub use bundle::{Bundle, BundleEntry};
pub use datatypes::{
    Address, CodeableConcept, Coding, ContactPoint, Extension, HumanName, Identifier, Period,
    Quantity, Reference, ReferenceTarget,
};
pub use resources::{
    Condition, Encounter, Observation, ObservationComponent, Organization, Patient,
    Practitioner, Resource,
};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

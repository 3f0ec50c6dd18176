//! Row types, create payloads and list filters for each healthcare entity.
//!
//! Each entity module defines three shapes:
//! - the stored record (`Patient`), decoded straight from a database row
//! - the create payload (`NewPatient`), also the target of merged partial updates
//! - the list filter (`PatientFilter`), bound from query parameters

pub mod condition;
pub mod encounter;
pub mod observation;
pub mod organization;
pub mod patient;
pub mod practitioner;
pub mod timestamp;

pub use condition::{Condition, ConditionFilter, NewCondition};
pub use encounter::{Encounter, EncounterFilter, NewEncounter};
pub use observation::{NewObservation, Observation, ObservationFilter};
pub use organization::{NewOrganization, Organization, OrganizationFilter};
pub use patient::{NewPatient, Patient, PatientFilter};
pub use practitioner::{NewPractitioner, Practitioner, PractitionerFilter};

/// The six stored entity types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Organization,
    Patient,
    Practitioner,
    Encounter,
    Condition,
    Observation,
}

impl EntityKind {
    /// Table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Organization => "organizations",
            EntityKind::Patient => "patients",
            EntityKind::Practitioner => "practitioners",
            EntityKind::Encounter => "encounters",
            EntityKind::Condition => "conditions",
            EntityKind::Observation => "observations",
        }
    }

    /// Capitalised name used in "not found" messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Organization => "Organization",
            EntityKind::Patient => "Patient",
            EntityKind::Practitioner => "Practitioner",
            EntityKind::Encounter => "Encounter",
            EntityKind::Condition => "Condition",
            EntityKind::Observation => "Observation",
        }
    }

    /// Lower-case name used inside sentences.
    pub fn singular(self) -> &'static str {
        match self {
            EntityKind::Organization => "organization",
            EntityKind::Patient => "patient",
            EntityKind::Practitioner => "practitioner",
            EntityKind::Encounter => "encounter",
            EntityKind::Condition => "condition",
            EntityKind::Observation => "observation",
        }
    }

    /// Tables and columns holding a foreign key to this kind.
    ///
    /// Deletes are restricted while any of these still point at the row.
    pub fn dependents(self) -> &'static [(EntityKind, &'static str)] {
        match self {
            EntityKind::Organization => &[
                (EntityKind::Practitioner, "organization_id"),
                (EntityKind::Encounter, "organization_id"),
            ],
            EntityKind::Patient => &[
                (EntityKind::Encounter, "patient_id"),
                (EntityKind::Condition, "patient_id"),
                (EntityKind::Observation, "patient_id"),
            ],
            EntityKind::Practitioner => &[
                (EntityKind::Encounter, "practitioner_id"),
                (EntityKind::Observation, "practitioner_id"),
            ],
            EntityKind::Encounter => &[
                (EntityKind::Condition, "encounter_id"),
                (EntityKind::Observation, "encounter_id"),
            ],
            EntityKind::Condition | EntityKind::Observation => &[],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.singular())
    }
}

//! Wire models for the six FHIR resources the importer maps to rows.
//!
//! Every field is optional and unknown fields are ignored; Synthea output is broad and the
//! importer only needs a slice of it.

use crate::datatypes::{
    CodeableConcept, Coding, ContactPoint, Address, Extension, HumanName, Identifier, Period,
    Quantity, Reference,
};
use serde::{Deserialize, Serialize};

/// A bundle entry's resource, keyed on `resourceType`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Organization(Organization),
    Patient(Patient),
    Practitioner(Practitioner),
    Encounter(Encounter),
    Condition(Condition),
    Observation(Observation),
    /// Any resource type the importer does not store.
    #[serde(other)]
    Other,
}

impl Resource {
    /// The resource's own `id`, if it has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Organization(r) => r.id.as_deref(),
            Resource::Patient(r) => r.id.as_deref(),
            Resource::Practitioner(r) => r.id.as_deref(),
            Resource::Encounter(r) => r.id.as_deref(),
            Resource::Condition(r) => r.id.as_deref(),
            Resource::Observation(r) => r.id.as_deref(),
            Resource::Other => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Organization {
    pub id: Option<String>,
    pub identifier: Vec<Identifier>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Vec<CodeableConcept>,
    pub telecom: Vec<ContactPoint>,
    pub address: Vec<Address>,
    pub part_of: Option<Reference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Communication {
    pub language: Option<CodeableConcept>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Patient {
    pub id: Option<String>,
    pub identifier: Vec<Identifier>,
    pub active: Option<bool>,
    pub name: Vec<HumanName>,
    pub telecom: Vec<ContactPoint>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub deceased_date_time: Option<String>,
    pub address: Vec<Address>,
    pub marital_status: Option<CodeableConcept>,
    pub communication: Vec<Communication>,
    pub extension: Vec<Extension>,
    pub managing_organization: Option<Reference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Qualification {
    pub code: Option<CodeableConcept>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Practitioner {
    pub id: Option<String>,
    pub identifier: Vec<Identifier>,
    pub name: Vec<HumanName>,
    pub telecom: Vec<ContactPoint>,
    pub gender: Option<String>,
    pub qualification: Vec<Qualification>,
    pub extension: Vec<Extension>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Participant {
    pub individual: Option<Reference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Encounter {
    pub id: Option<String>,
    pub identifier: Vec<Identifier>,
    pub status: Option<String>,
    pub class: Option<Coding>,
    #[serde(rename = "type")]
    pub type_: Vec<CodeableConcept>,
    pub subject: Option<Reference>,
    pub participant: Vec<Participant>,
    pub period: Option<Period>,
    pub reason_code: Vec<CodeableConcept>,
    pub service_provider: Option<Reference>,
}

impl Encounter {
    /// First participant's individual.
    pub fn primary_performer(&self) -> Option<&Reference> {
        self.participant.iter().find_map(|p| p.individual.as_ref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Condition {
    pub id: Option<String>,
    pub clinical_status: Option<CodeableConcept>,
    pub verification_status: Option<CodeableConcept>,
    pub category: Vec<CodeableConcept>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub encounter: Option<Reference>,
    pub onset_date_time: Option<String>,
    pub onset_period: Option<Period>,
    pub abatement_date_time: Option<String>,
    pub recorded_date: Option<String>,
}

impl Condition {
    pub fn onset(&self) -> Option<&str> {
        self.onset_date_time
            .as_deref()
            .or_else(|| self.onset_period.as_ref().and_then(|p| p.start.as_deref()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservationComponent {
    pub code: Option<CodeableConcept>,
    pub value_quantity: Option<Quantity>,
    pub value_string: Option<String>,
    pub value_codeable_concept: Option<CodeableConcept>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Observation {
    pub id: Option<String>,
    pub identifier: Vec<Identifier>,
    pub status: Option<String>,
    pub category: Vec<CodeableConcept>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub encounter: Option<Reference>,
    pub performer: Vec<Reference>,
    pub effective_date_time: Option<String>,
    pub effective_period: Option<Period>,
    pub issued: Option<String>,
    pub value_quantity: Option<Quantity>,
    pub value_string: Option<String>,
    pub value_codeable_concept: Option<CodeableConcept>,
    pub component: Vec<ObservationComponent>,
}

impl Observation {
    /// `effectiveDateTime`, falling back to the start of `effectivePeriod`.
    pub fn effective(&self) -> Option<&str> {
        self.effective_date_time
            .as_deref()
            .or_else(|| self.effective_period.as_ref().and_then(|p| p.start.as_deref()))
    }

    /// Text value: `valueString`, else the display of `valueCodeableConcept`.
    pub fn value_text(&self) -> Option<&str> {
        self.value_string
            .as_deref()
            .or_else(|| self.value_codeable_concept.as_ref().and_then(|c| c.display()))
    }
}

use crate::routes::{
    conditions, encounters, health, observations, organizations, patients, practitioners,
};
use api_shared::{ErrorBody, HealthRes};
use hc_core::models::{
    Condition, Encounter, NewCondition, NewEncounter, NewObservation, NewOrganization,
    NewPatient, NewPractitioner, Observation, Organization, Patient, Practitioner,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        organizations::list_organizations,
        organizations::get_organization,
        organizations::create_organization,
        organizations::update_organization,
        organizations::delete_organization,
        patients::list_patients,
        patients::get_patient,
        patients::create_patient,
        patients::update_patient,
        patients::delete_patient,
        practitioners::list_practitioners,
        practitioners::get_practitioner,
        practitioners::create_practitioner,
        practitioners::update_practitioner,
        practitioners::delete_practitioner,
        encounters::list_encounters,
        encounters::get_encounter,
        encounters::create_encounter,
        encounters::update_encounter,
        encounters::delete_encounter,
        conditions::list_conditions,
        conditions::get_condition,
        conditions::create_condition,
        conditions::update_condition,
        conditions::delete_condition,
        observations::list_observations,
        observations::get_observation,
        observations::create_observation,
        observations::update_observation,
        observations::delete_observation,
    ),
    components(schemas(
        HealthRes,
        ErrorBody,
        Organization,
        NewOrganization,
        Patient,
        NewPatient,
        Practitioner,
        NewPractitioner,
        Encounter,
        NewEncounter,
        Condition,
        NewCondition,
        Observation,
        NewObservation,
    )),
    tags(
        (name = "health"),
        (name = "organizations"),
        (name = "patients"),
        (name = "practitioners"),
        (name = "encounters"),
        (name = "conditions"),
        (name = "observations"),
    )
)]
pub struct ApiDoc;

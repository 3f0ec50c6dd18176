//! Persistence services, one per entity.
//!
//! Each service owns a clone of the connection pool and exposes the same five operations:
//! `list`, `get`, `create`, `update` and `delete`.

pub mod condition;
pub mod encounter;
pub mod helpers;
pub mod observation;
pub mod organization;
pub mod patient;
pub mod practitioner;

pub use condition::ConditionService;
pub use encounter::EncounterService;
pub use helpers::Page;
pub use observation::ObservationService;
pub use organization::OrganizationService;
pub use patient::PatientService;
pub use practitioner::PractitionerService;

use sqlx::SqlitePool;

/// All entity services over one shared pool.
#[derive(Clone, Debug)]
pub struct Services {
    pub organizations: OrganizationService,
    pub patients: PatientService,
    pub practitioners: PractitionerService,
    pub encounters: EncounterService,
    pub conditions: ConditionService,
    pub observations: ObservationService,
}

impl Services {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            organizations: OrganizationService::new(pool.clone()),
            patients: PatientService::new(pool.clone()),
            practitioners: PractitionerService::new(pool.clone()),
            encounters: EncounterService::new(pool.clone()),
            conditions: ConditionService::new(pool.clone()),
            observations: ObservationService::new(pool),
        }
    }
}

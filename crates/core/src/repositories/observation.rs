//! Observation persistence.

use super::helpers::{
    delete_restricted, ensure_reference, fetch_by_id, merge_patch, ListQuery, Page,
};
use crate::models::{EntityKind, NewObservation, Observation, ObservationFilter};
use crate::validation::Validate;
use crate::CoreResult;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

const KIND: EntityKind = EntityKind::Observation;

#[derive(Clone, Debug)]
pub struct ObservationService {
    pool: SqlitePool,
}

impl ObservationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ObservationFilter) -> CoreResult<Vec<Observation>> {
        let page = Page::resolve(filter.limit, filter.offset)?;
        let mut query = ListQuery::new(KIND);
        query.eq("patient_id", filter.patient_id);
        query.eq("encounter_id", filter.encounter_id);
        query.eq("practitioner_id", filter.practitioner_id);
        query.eq("status", filter.status.clone());
        query.contains("code", filter.code.as_deref());
        query.between(
            "effective_time",
            ("effective_from", filter.effective_from.as_deref()),
            ("effective_to", filter.effective_to.as_deref()),
        )?;

        tracing::debug!(limit = page.limit, offset = page.offset, "listing observations");
        query.fetch_page(&self.pool, page).await
    }

    pub async fn get(&self, id: i64) -> CoreResult<Observation> {
        fetch_by_id(&self.pool, KIND, id).await
    }

    async fn check(&self, new: &NewObservation) -> CoreResult<()> {
        new.validate()?;
        ensure_reference(&self.pool, "patient_id", EntityKind::Patient, Some(new.patient_id))
            .await?;
        ensure_reference(
            &self.pool,
            "encounter_id",
            EntityKind::Encounter,
            new.encounter_id,
        )
        .await?;
        ensure_reference(
            &self.pool,
            "practitioner_id",
            EntityKind::Practitioner,
            new.practitioner_id,
        )
        .await
    }

    pub async fn create(&self, new: NewObservation) -> CoreResult<Observation> {
        self.check(&new).await?;

        let created = sqlx::query_as::<_, Observation>(
            "INSERT INTO observations (patient_id, encounter_id, practitioner_id, identifier, \
             status, code, code_system, code_display, value_quantity, value_unit, value_string, \
             effective_time, issued_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.patient_id)
        .bind(new.encounter_id)
        .bind(new.practitioner_id)
        .bind(&new.identifier)
        .bind(&new.status)
        .bind(&new.code)
        .bind(&new.code_system)
        .bind(&new.code_display)
        .bind(new.value_quantity)
        .bind(&new.value_unit)
        .bind(&new.value_string)
        .bind(new.effective_time)
        .bind(new.issued_time)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = created.id, patient_id = created.patient_id, "created observation");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: &Map<String, Value>) -> CoreResult<Observation> {
        let current = self.get(id).await?;
        let merged: NewObservation = merge_patch(&current, patch)?;
        self.check(&merged).await?;

        let updated = sqlx::query_as::<_, Observation>(
            "UPDATE observations SET patient_id = ?, encounter_id = ?, practitioner_id = ?, \
             identifier = ?, status = ?, code = ?, code_system = ?, code_display = ?, \
             value_quantity = ?, value_unit = ?, value_string = ?, effective_time = ?, \
             issued_time = ? WHERE id = ? RETURNING *",
        )
        .bind(merged.patient_id)
        .bind(merged.encounter_id)
        .bind(merged.practitioner_id)
        .bind(&merged.identifier)
        .bind(&merged.status)
        .bind(&merged.code)
        .bind(&merged.code_system)
        .bind(&merged.code_display)
        .bind(merged.value_quantity)
        .bind(&merged.value_unit)
        .bind(&merged.value_string)
        .bind(merged.effective_time)
        .bind(merged.issued_time)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, "updated observation");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        delete_restricted(&self.pool, KIND, id).await?;
        tracing::info!(id, "deleted observation");
        Ok(())
    }
}

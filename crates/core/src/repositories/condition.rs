//! Condition persistence.

use super::helpers::{
    delete_restricted, ensure_reference, fetch_by_id, merge_patch, ListQuery, Page,
};
use crate::models::{Condition, ConditionFilter, EntityKind, NewCondition};
use crate::validation::Validate;
use crate::CoreResult;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

const KIND: EntityKind = EntityKind::Condition;

#[derive(Clone, Debug)]
pub struct ConditionService {
    pool: SqlitePool,
}

impl ConditionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ConditionFilter) -> CoreResult<Vec<Condition>> {
        let page = Page::resolve(filter.limit, filter.offset)?;
        let mut query = ListQuery::new(KIND);
        query.eq("patient_id", filter.patient_id);
        query.eq("encounter_id", filter.encounter_id);
        query.contains("code", filter.code.as_deref());
        query.eq("clinical_status", filter.clinical_status.clone());
        query.eq("verification_status", filter.verification_status.clone());
        query.eq("category_code", filter.category_code.clone());
        query.between(
            "onset_time",
            ("onset_from", filter.onset_from.as_deref()),
            ("onset_to", filter.onset_to.as_deref()),
        )?;

        tracing::debug!(limit = page.limit, offset = page.offset, "listing conditions");
        query.fetch_page(&self.pool, page).await
    }

    pub async fn get(&self, id: i64) -> CoreResult<Condition> {
        fetch_by_id(&self.pool, KIND, id).await
    }

    async fn check(&self, new: &NewCondition) -> CoreResult<()> {
        new.validate()?;
        ensure_reference(&self.pool, "patient_id", EntityKind::Patient, Some(new.patient_id))
            .await?;
        ensure_reference(
            &self.pool,
            "encounter_id",
            EntityKind::Encounter,
            new.encounter_id,
        )
        .await
    }

    pub async fn create(&self, new: NewCondition) -> CoreResult<Condition> {
        self.check(&new).await?;

        let created = sqlx::query_as::<_, Condition>(
            "INSERT INTO conditions (patient_id, encounter_id, code, system, display, \
             category_code, clinical_status, verification_status, onset_time, abatement_time, \
             recorded_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.patient_id)
        .bind(new.encounter_id)
        .bind(&new.code)
        .bind(&new.system)
        .bind(&new.display)
        .bind(&new.category_code)
        .bind(&new.clinical_status)
        .bind(&new.verification_status)
        .bind(new.onset_time)
        .bind(new.abatement_time)
        .bind(new.recorded_date)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = created.id, patient_id = created.patient_id, "created condition");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: &Map<String, Value>) -> CoreResult<Condition> {
        let current = self.get(id).await?;
        let merged: NewCondition = merge_patch(&current, patch)?;
        self.check(&merged).await?;

        let updated = sqlx::query_as::<_, Condition>(
            "UPDATE conditions SET patient_id = ?, encounter_id = ?, code = ?, system = ?, \
             display = ?, category_code = ?, clinical_status = ?, verification_status = ?, \
             onset_time = ?, abatement_time = ?, recorded_date = ? WHERE id = ? RETURNING *",
        )
        .bind(merged.patient_id)
        .bind(merged.encounter_id)
        .bind(&merged.code)
        .bind(&merged.system)
        .bind(&merged.display)
        .bind(&merged.category_code)
        .bind(&merged.clinical_status)
        .bind(&merged.verification_status)
        .bind(merged.onset_time)
        .bind(merged.abatement_time)
        .bind(merged.recorded_date)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, "updated condition");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        delete_restricted(&self.pool, KIND, id).await?;
        tracing::info!(id, "deleted condition");
        Ok(())
    }
}

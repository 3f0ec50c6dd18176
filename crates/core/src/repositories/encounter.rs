//! Encounter persistence.

use super::helpers::{
    delete_restricted, ensure_reference, fetch_by_id, merge_patch, ListQuery, Page,
};
use crate::models::{Encounter, EncounterFilter, EntityKind, NewEncounter};
use crate::validation::Validate;
use crate::CoreResult;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

const KIND: EntityKind = EntityKind::Encounter;

#[derive(Clone, Debug)]
pub struct EncounterService {
    pool: SqlitePool,
}

impl EncounterService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &EncounterFilter) -> CoreResult<Vec<Encounter>> {
        let page = Page::resolve(filter.limit, filter.offset)?;
        let mut query = ListQuery::new(KIND);
        query.eq("patient_id", filter.patient_id);
        query.eq("practitioner_id", filter.practitioner_id);
        query.eq("organization_id", filter.organization_id);
        query.eq("status", filter.status.clone());
        query.eq("class_code", filter.class_code.clone());
        query.between(
            "start_time",
            ("start_from", filter.start_from.as_deref()),
            ("start_to", filter.start_to.as_deref()),
        )?;

        tracing::debug!(limit = page.limit, offset = page.offset, "listing encounters");
        query.fetch_page(&self.pool, page).await
    }

    pub async fn get(&self, id: i64) -> CoreResult<Encounter> {
        fetch_by_id(&self.pool, KIND, id).await
    }

    async fn check(&self, new: &NewEncounter) -> CoreResult<()> {
        new.validate()?;
        ensure_reference(&self.pool, "patient_id", EntityKind::Patient, Some(new.patient_id))
            .await?;
        ensure_reference(
            &self.pool,
            "practitioner_id",
            EntityKind::Practitioner,
            new.practitioner_id,
        )
        .await?;
        ensure_reference(
            &self.pool,
            "organization_id",
            EntityKind::Organization,
            new.organization_id,
        )
        .await
    }

    pub async fn create(&self, new: NewEncounter) -> CoreResult<Encounter> {
        self.check(&new).await?;

        let created = sqlx::query_as::<_, Encounter>(
            "INSERT INTO encounters (patient_id, practitioner_id, organization_id, identifier, \
             status, class_code, class_display, start_time, end_time, reason_code, \
             reason_display) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.patient_id)
        .bind(new.practitioner_id)
        .bind(new.organization_id)
        .bind(&new.identifier)
        .bind(&new.status)
        .bind(&new.class_code)
        .bind(&new.class_display)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(&new.reason_code)
        .bind(&new.reason_display)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = created.id, patient_id = created.patient_id, "created encounter");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: &Map<String, Value>) -> CoreResult<Encounter> {
        let current = self.get(id).await?;
        let merged: NewEncounter = merge_patch(&current, patch)?;
        self.check(&merged).await?;

        let updated = sqlx::query_as::<_, Encounter>(
            "UPDATE encounters SET patient_id = ?, practitioner_id = ?, organization_id = ?, \
             identifier = ?, status = ?, class_code = ?, class_display = ?, start_time = ?, \
             end_time = ?, reason_code = ?, reason_display = ? WHERE id = ? RETURNING *",
        )
        .bind(merged.patient_id)
        .bind(merged.practitioner_id)
        .bind(merged.organization_id)
        .bind(&merged.identifier)
        .bind(&merged.status)
        .bind(&merged.class_code)
        .bind(&merged.class_display)
        .bind(merged.start_time)
        .bind(merged.end_time)
        .bind(&merged.reason_code)
        .bind(&merged.reason_display)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, "updated encounter");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        delete_restricted(&self.pool, KIND, id).await?;
        tracing::info!(id, "deleted encounter");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::NewPatient;
    use crate::repositories::PatientService;
    use crate::CoreError;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    async fn seeded() -> (EncounterService, i64) {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let patient = PatientService::new(pool.clone())
            .create(NewPatient::new(
                "MRN-1",
                "Ada",
                "Lovelace",
                NaiveDate::from_ymd_opt(1990, 5, 15).expect("valid date"),
            ))
            .await
            .expect("create patient");
        (EncounterService::new(pool), patient.id)
    }

    fn visit(patient_id: i64, day: u32, status: &str) -> NewEncounter {
        NewEncounter {
            patient_id,
            status: status.into(),
            class_code: Some("AMB".into()),
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_encounter() {
        let (service, patient_id) = seeded().await;
        let created = service
            .create(visit(patient_id, 1, "finished"))
            .await
            .expect("create should succeed");
        assert_eq!(created.patient_id, patient_id);
        assert_eq!(
            created.start_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(service.get(created.id).await.expect("get"), created);
    }

    #[tokio::test]
    async fn test_unknown_patient_is_foreign_key_error() {
        let (service, _) = seeded().await;
        let err = service
            .create(visit(999, 1, "finished"))
            .await
            .expect_err("unknown patient should fail");
        assert!(matches!(
            err,
            CoreError::ForeignKey {
                field: "patient_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_start_range_filter_with_plain_dates() {
        let (service, patient_id) = seeded().await;
        for day in [1, 5, 10] {
            service
                .create(visit(patient_id, day, "finished"))
                .await
                .expect("create should succeed");
        }

        let filter = EncounterFilter {
            start_from: Some("2024-03-05".into()),
            start_to: Some("2024-03-10".into()),
            ..Default::default()
        };
        let found = service.list(&filter).await.expect("list should succeed");
        assert_eq!(found.len(), 2);

        let filter = EncounterFilter {
            start_to: Some("not a date".into()),
            ..Default::default()
        };
        let err = service.list(&filter).await.expect_err("bad bound should fail");
        assert!(err.to_string().contains("start_to"));
    }

    #[tokio::test]
    async fn test_patient_delete_restricted_while_encounters_exist() {
        let (service, patient_id) = seeded().await;
        let encounter = service
            .create(visit(patient_id, 1, "finished"))
            .await
            .expect("create should succeed");

        let patients = PatientService::new(service.pool.clone());
        let err = patients
            .delete(patient_id)
            .await
            .expect_err("patient with encounters should not be deleted");
        assert_eq!(
            err.to_string(),
            format!("patient {patient_id} is still referenced by 1 encounter(s)")
        );

        service.delete(encounter.id).await.expect("delete encounter");
        patients.delete(patient_id).await.expect("delete patient");
    }

    #[tokio::test]
    async fn test_update_revalidates_merged_record() {
        let (service, patient_id) = seeded().await;
        let created = service
            .create(visit(patient_id, 1, "finished"))
            .await
            .expect("create should succeed");

        let patch = json!({"practitioner_id": 404});
        let err = service
            .update(created.id, patch.as_object().expect("object"))
            .await
            .expect_err("unknown practitioner should fail");
        assert!(matches!(
            err,
            CoreError::ForeignKey {
                field: "practitioner_id",
                id: 404,
                ..
            }
        ));

        let patch = json!({"end_time": "2024-03-01T08:00:00Z"});
        let err = service
            .update(created.id, patch.as_object().expect("object"))
            .await
            .expect_err("end before start should fail");
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(err.to_string().contains("end_time"));

        assert_eq!(service.get(created.id).await.expect("get"), created);
    }
}

//! Patient persistence.
//!
//! `identifier` is the MRN and is unique. Duplicates are reported as `CoreError::Conflict` before
//! the insert is attempted; the unique index backs this up for concurrent writers.

use super::helpers::{delete_restricted, fetch_by_id, merge_patch, ListQuery, Page};
use crate::models::{EntityKind, NewPatient, Patient, PatientFilter};
use crate::validation::Validate;
use crate::{CoreError, CoreResult};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

const KIND: EntityKind = EntityKind::Patient;

#[derive(Clone, Debug)]
pub struct PatientService {
    pool: SqlitePool,
}

impl PatientService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &PatientFilter) -> CoreResult<Vec<Patient>> {
        let page = Page::resolve(filter.limit, filter.offset)?;
        let mut query = ListQuery::new(KIND);
        query.eq("identifier", filter.identifier.clone());
        query.contains("first_name", filter.first_name.as_deref());
        query.contains("last_name", filter.last_name.as_deref());
        query.eq("birth_date", filter.birth_date);
        query.eq("gender", filter.gender.clone());
        query.eq("active", filter.active);

        tracing::debug!(limit = page.limit, offset = page.offset, "listing patients");
        query.fetch_page(&self.pool, page).await
    }

    pub async fn get(&self, id: i64) -> CoreResult<Patient> {
        fetch_by_id(&self.pool, KIND, id).await
    }

    pub async fn find_by_identifier(&self, identifier: &str) -> CoreResult<Option<Patient>> {
        let row = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE identifier = ?")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ensure_identifier_free(&self, identifier: &str, except_id: Option<i64>) -> CoreResult<()> {
        match self.find_by_identifier(identifier).await? {
            Some(existing) if Some(existing.id) != except_id => Err(CoreError::Conflict(format!(
                "patient identifier {identifier} already exists"
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create(&self, new: NewPatient) -> CoreResult<Patient> {
        new.validate()?;
        self.ensure_identifier_free(&new.identifier, None).await?;

        let created = sqlx::query_as::<_, Patient>(
            "INSERT INTO patients (identifier, first_name, last_name, birth_date, gender, phone, \
             email, address_line, city, state, postal_code, marital_status, language, race, \
             ethnicity, deceased_date, active, managing_organization_identifier) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&new.identifier)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.birth_date)
        .bind(&new.gender)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.address_line)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.postal_code)
        .bind(&new.marital_status)
        .bind(&new.language)
        .bind(&new.race)
        .bind(&new.ethnicity)
        .bind(&new.deceased_date)
        .bind(new.active)
        .bind(&new.managing_organization_identifier)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = created.id, "created patient");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: &Map<String, Value>) -> CoreResult<Patient> {
        let current = self.get(id).await?;
        let merged: NewPatient = merge_patch(&current, patch)?;
        merged.validate()?;
        self.ensure_identifier_free(&merged.identifier, Some(id)).await?;

        let updated = sqlx::query_as::<_, Patient>(
            "UPDATE patients SET identifier = ?, first_name = ?, last_name = ?, birth_date = ?, \
             gender = ?, phone = ?, email = ?, address_line = ?, city = ?, state = ?, \
             postal_code = ?, marital_status = ?, language = ?, race = ?, ethnicity = ?, \
             deceased_date = ?, active = ?, managing_organization_identifier = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(&merged.identifier)
        .bind(&merged.first_name)
        .bind(&merged.last_name)
        .bind(merged.birth_date)
        .bind(&merged.gender)
        .bind(&merged.phone)
        .bind(&merged.email)
        .bind(&merged.address_line)
        .bind(&merged.city)
        .bind(&merged.state)
        .bind(&merged.postal_code)
        .bind(&merged.marital_status)
        .bind(&merged.language)
        .bind(&merged.race)
        .bind(&merged.ethnicity)
        .bind(&merged.deceased_date)
        .bind(merged.active)
        .bind(&merged.managing_organization_identifier)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, "updated patient");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        delete_restricted(&self.pool, KIND, id).await?;
        tracing::info!(id, "deleted patient");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use chrono::NaiveDate;
    use serde_json::json;

    fn birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 5, 15).expect("valid date")
    }

    async fn test_service() -> PatientService {
        PatientService::new(connect_in_memory().await.expect("in-memory pool"))
    }

    #[tokio::test]
    async fn test_create_defaults_active_and_round_trips_fields() {
        let service = test_service().await;
        let mut new = NewPatient::new("MRN-100", "Ada", "Lovelace", birth_date());
        new.city = Some("London".into());

        let created = service.create(new.clone()).await.expect("create should succeed");
        assert!(created.active);
        assert_eq!(created.identifier, new.identifier);
        assert_eq!(created.birth_date, new.birth_date);
        assert_eq!(created.city.as_deref(), Some("London"));

        let fetched = service.get(created.id).await.expect("get should succeed");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let service = test_service().await;
        let created = service
            .create(NewPatient::new("MRN-101", "Alan", "Turing", birth_date()))
            .await
            .expect("create should succeed");

        let patch = json!({"city": "NYC", "active": false});
        let updated = service
            .update(created.id, patch.as_object().expect("object"))
            .await
            .expect("update should succeed");

        assert_eq!(updated.city.as_deref(), Some("NYC"));
        assert!(!updated.active);
        assert_eq!(updated.first_name, "Alan");
        assert_eq!(updated.birth_date, birth_date());
    }

    #[tokio::test]
    async fn test_duplicate_identifier_is_conflict() {
        let service = test_service().await;
        service
            .create(NewPatient::new("MRN-1", "Ada", "Lovelace", birth_date()))
            .await
            .expect("first create should succeed");
        let err = service
            .create(NewPatient::new("MRN-1", "Grace", "Hopper", birth_date()))
            .await
            .expect_err("duplicate identifier should fail");
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_missing_patient_is_not_found() {
        let service = test_service().await;
        let patch = json!({"city": "NYC"});
        let err = service
            .update(42, patch.as_object().expect("object"))
            .await
            .expect_err("missing patient should fail");
        assert_eq!(err.to_string(), "Patient not found");
    }

    #[tokio::test]
    async fn test_pagination_partitions_in_id_order() {
        let service = test_service().await;
        for i in 0..7 {
            service
                .create(NewPatient::new(format!("MRN-{i}"), "Test", "Patient", birth_date()))
                .await
                .expect("create should succeed");
        }

        let mut seen = Vec::new();
        for offset in [0, 3, 6] {
            let filter = PatientFilter {
                limit: Some(3),
                offset: Some(offset),
                ..Default::default()
            };
            let page = service.list(&filter).await.expect("list should succeed");
            assert!(page.len() <= 3);
            seen.extend(page.into_iter().map(|p| p.id));
        }

        let mut sorted = seen.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(seen, sorted);
        assert_eq!(seen.len(), 7);
    }

    #[tokio::test]
    async fn test_list_filters_by_name_and_active() {
        let service = test_service().await;
        service
            .create(NewPatient::new("MRN-1", "Ada", "Lovelace", birth_date()))
            .await
            .expect("create");
        let mut inactive = NewPatient::new("MRN-2", "Adam", "Smith", birth_date());
        inactive.active = false;
        service.create(inactive).await.expect("create");

        let filter = PatientFilter {
            first_name: Some("ada".into()),
            ..Default::default()
        };
        assert_eq!(service.list(&filter).await.expect("list").len(), 2);

        let filter = PatientFilter {
            first_name: Some("ada".into()),
            active: Some(true),
            ..Default::default()
        };
        let found = service.list(&filter).await.expect("list");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "MRN-1");
    }

    #[tokio::test]
    async fn test_update_to_taken_identifier_is_conflict() {
        let service = test_service().await;
        service
            .create(NewPatient::new("MRN-1", "Ada", "Lovelace", birth_date()))
            .await
            .expect("create should succeed");
        let other = service
            .create(NewPatient::new("MRN-2", "Grace", "Hopper", birth_date()))
            .await
            .expect("create should succeed");

        let patch = json!({"identifier": "MRN-1"});
        let err = service
            .update(other.id, patch.as_object().expect("object"))
            .await
            .expect_err("taken identifier should fail");
        assert!(matches!(err, CoreError::Conflict(_)));

        let patch = json!({"identifier": "MRN-2", "city": "Arlington"});
        let updated = service
            .update(other.id, patch.as_object().expect("object"))
            .await
            .expect("keeping its own identifier should succeed");
        assert_eq!(updated.city.as_deref(), Some("Arlington"));
    }
}

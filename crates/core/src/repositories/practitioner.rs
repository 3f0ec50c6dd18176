//! Practitioner persistence.

use super::helpers::{
    delete_restricted, ensure_reference, fetch_by_id, merge_patch, ListQuery, Page,
};
use crate::models::{EntityKind, NewPractitioner, Practitioner, PractitionerFilter};
use crate::validation::Validate;
use crate::CoreResult;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

const KIND: EntityKind = EntityKind::Practitioner;

#[derive(Clone, Debug)]
pub struct PractitionerService {
    pool: SqlitePool,
}

impl PractitionerService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &PractitionerFilter) -> CoreResult<Vec<Practitioner>> {
        let page = Page::resolve(filter.limit, filter.offset)?;
        let mut query = ListQuery::new(KIND);
        query.contains("name", filter.name.as_deref());
        query.eq("organization_id", filter.organization_id);
        query.eq("specialty_code", filter.specialty_code.clone());
        query.eq("gender", filter.gender.clone());
        query.eq("identifier", filter.identifier.clone());

        tracing::debug!(limit = page.limit, offset = page.offset, "listing practitioners");
        query.fetch_page(&self.pool, page).await
    }

    pub async fn get(&self, id: i64) -> CoreResult<Practitioner> {
        fetch_by_id(&self.pool, KIND, id).await
    }

    pub async fn find_by_identifier(&self, identifier: &str) -> CoreResult<Option<Practitioner>> {
        let row = sqlx::query_as::<_, Practitioner>(
            "SELECT * FROM practitioners WHERE identifier = ? ORDER BY id ASC LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn check(&self, new: &NewPractitioner) -> CoreResult<()> {
        new.validate()?;
        ensure_reference(
            &self.pool,
            "organization_id",
            EntityKind::Organization,
            new.organization_id,
        )
        .await
    }

    pub async fn create(&self, new: NewPractitioner) -> CoreResult<Practitioner> {
        self.check(&new).await?;

        let created = sqlx::query_as::<_, Practitioner>(
            "INSERT INTO practitioners (identifier, name, gender, specialty_code, \
             specialty_display, phone, email, organization_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&new.identifier)
        .bind(&new.name)
        .bind(&new.gender)
        .bind(&new.specialty_code)
        .bind(&new.specialty_display)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(new.organization_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = created.id, "created practitioner");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: &Map<String, Value>) -> CoreResult<Practitioner> {
        let current = self.get(id).await?;
        let merged: NewPractitioner = merge_patch(&current, patch)?;
        self.check(&merged).await?;

        let updated = sqlx::query_as::<_, Practitioner>(
            "UPDATE practitioners SET identifier = ?, name = ?, gender = ?, specialty_code = ?, \
             specialty_display = ?, phone = ?, email = ?, organization_id = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(&merged.identifier)
        .bind(&merged.name)
        .bind(&merged.gender)
        .bind(&merged.specialty_code)
        .bind(&merged.specialty_display)
        .bind(&merged.phone)
        .bind(&merged.email)
        .bind(merged.organization_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, "updated practitioner");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        delete_restricted(&self.pool, KIND, id).await?;
        tracing::info!(id, "deleted practitioner");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::NewOrganization;
    use crate::repositories::OrganizationService;
    use crate::CoreError;

    #[tokio::test]
    async fn test_unknown_organization_is_foreign_key_error() {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let service = PractitionerService::new(pool);

        let err = service
            .create(NewPractitioner {
                name: "Dr. Gregory House".into(),
                organization_id: Some(404),
                ..Default::default()
            })
            .await
            .expect_err("unknown organization should fail");
        assert_eq!(
            err.to_string(),
            "organization_id references unknown organization 404"
        );
    }

    #[tokio::test]
    async fn test_filter_by_organization() {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let orgs = OrganizationService::new(pool.clone());
        let service = PractitionerService::new(pool);

        let org = orgs
            .create(NewOrganization {
                identifier: "ORG-1".into(),
                name: "Princeton-Plainsboro".into(),
                ..Default::default()
            })
            .await
            .expect("create organization");

        service
            .create(NewPractitioner {
                name: "Dr. Lisa Cuddy".into(),
                organization_id: Some(org.id),
                ..Default::default()
            })
            .await
            .expect("create practitioner");
        service
            .create(NewPractitioner {
                name: "Dr. Unaffiliated".into(),
                ..Default::default()
            })
            .await
            .expect("create practitioner");

        let filter = PractitionerFilter {
            organization_id: Some(org.id),
            ..Default::default()
        };
        let found = service.list(&filter).await.expect("list should succeed");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Dr. Lisa Cuddy");

        let err = orgs
            .delete(org.id)
            .await
            .expect_err("referenced organization should not be deleted");
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}

//! Organization persistence.

use super::helpers::{delete_restricted, fetch_by_id, merge_patch, ListQuery, Page};
use crate::models::{EntityKind, NewOrganization, Organization, OrganizationFilter};
use crate::validation::Validate;
use crate::{CoreError, CoreResult};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

const KIND: EntityKind = EntityKind::Organization;

#[derive(Clone, Debug)]
pub struct OrganizationService {
    pool: SqlitePool,
}

impl OrganizationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &OrganizationFilter) -> CoreResult<Vec<Organization>> {
        let page = Page::resolve(filter.limit, filter.offset)?;
        let mut query = ListQuery::new(KIND);
        query.contains("name", filter.name.as_deref());
        query.eq("type_code", filter.type_code.clone());
        query.contains("city", filter.city.as_deref());
        query.eq("state", filter.state.clone());
        query.eq("identifier", filter.identifier.clone());

        tracing::debug!(limit = page.limit, offset = page.offset, "listing organizations");
        query.fetch_page(&self.pool, page).await
    }

    pub async fn get(&self, id: i64) -> CoreResult<Organization> {
        fetch_by_id(&self.pool, KIND, id).await
    }

    pub async fn find_by_identifier(&self, identifier: &str) -> CoreResult<Option<Organization>> {
        let row =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE identifier = ?")
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn ensure_identifier_free(&self, identifier: &str, except_id: Option<i64>) -> CoreResult<()> {
        match self.find_by_identifier(identifier).await? {
            Some(existing) if Some(existing.id) != except_id => Err(CoreError::Conflict(format!(
                "organization identifier {identifier} already exists"
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create(&self, new: NewOrganization) -> CoreResult<Organization> {
        new.validate()?;
        self.ensure_identifier_free(&new.identifier, None).await?;

        let created = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (identifier, name, type_code, type_display, phone, email, \
             address_line, city, state, postal_code, part_of_identifier) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&new.identifier)
        .bind(&new.name)
        .bind(&new.type_code)
        .bind(&new.type_display)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.address_line)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.postal_code)
        .bind(&new.part_of_identifier)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = created.id, "created organization");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: &Map<String, Value>) -> CoreResult<Organization> {
        let current = self.get(id).await?;
        let merged: NewOrganization = merge_patch(&current, patch)?;
        merged.validate()?;
        self.ensure_identifier_free(&merged.identifier, Some(id)).await?;

        let updated = sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET identifier = ?, name = ?, type_code = ?, type_display = ?, \
             phone = ?, email = ?, address_line = ?, city = ?, state = ?, postal_code = ?, \
             part_of_identifier = ? WHERE id = ? RETURNING *",
        )
        .bind(&merged.identifier)
        .bind(&merged.name)
        .bind(&merged.type_code)
        .bind(&merged.type_display)
        .bind(&merged.phone)
        .bind(&merged.email)
        .bind(&merged.address_line)
        .bind(&merged.city)
        .bind(&merged.state)
        .bind(&merged.postal_code)
        .bind(&merged.part_of_identifier)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, "updated organization");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<()> {
        delete_restricted(&self.pool, KIND, id).await?;
        tracing::info!(id, "deleted organization");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use serde_json::json;

    fn org(identifier: &str, name: &str, city: &str) -> NewOrganization {
        NewOrganization {
            identifier: identifier.into(),
            name: name.into(),
            city: Some(city.into()),
            state: Some("MA".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let service = OrganizationService::new(pool);

        let created = service
            .create(org("ORG-1", "General Hospital", "Boston"))
            .await
            .expect("create should succeed");
        assert_eq!(created.name, "General Hospital");

        let fetched = service.get(created.id).await.expect("get should succeed");
        assert_eq!(fetched, created);

        let patch = json!({"city": "Cambridge"});
        let updated = service
            .update(created.id, patch.as_object().expect("object"))
            .await
            .expect("update should succeed");
        assert_eq!(updated.city.as_deref(), Some("Cambridge"));
        assert_eq!(updated.name, "General Hospital");

        service.delete(created.id).await.expect("delete should succeed");
        assert!(matches!(
            service.get(created.id).await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(created.id).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_substring_case_insensitive() {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let service = OrganizationService::new(pool);
        service
            .create(org("ORG-1", "Boston General Hospital", "Boston"))
            .await
            .expect("create");
        service
            .create(org("ORG-2", "Cambridge Clinic", "Cambridge"))
            .await
            .expect("create");

        let filter = OrganizationFilter {
            name: Some("general".into()),
            ..Default::default()
        };
        let found = service.list(&filter).await.expect("list should succeed");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "ORG-1");

        let filter = OrganizationFilter {
            city: Some("BRIDGE".into()),
            ..Default::default()
        };
        let found = service.list(&filter).await.expect("list should succeed");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "ORG-2");
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let service = OrganizationService::new(pool);
        let err = service
            .create(org("ORG-1", " ", "Boston"))
            .await
            .expect_err("blank name should fail");
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_duplicate_identifier_is_conflict() {
        let pool = connect_in_memory().await.expect("in-memory pool");
        let service = OrganizationService::new(pool);
        service
            .create(org("ORG-1", "General Hospital", "Boston"))
            .await
            .expect("first create should succeed");
        let err = service
            .create(org("ORG-1", "Other Clinic", "Salem"))
            .await
            .expect_err("duplicate identifier should fail");
        assert!(matches!(err, CoreError::Conflict(_)));

        let second = service
            .create(org("ORG-2", "Other Clinic", "Salem"))
            .await
            .expect("distinct identifier should succeed");
        let patch = json!({"identifier": "ORG-1"});
        let err = service
            .update(second.id, patch.as_object().expect("object"))
            .await
            .expect_err("taking another identifier should fail");
        assert!(matches!(err, CoreError::Conflict(_)));

        let patch = json!({"identifier": "ORG-2", "name": "Renamed Clinic"});
        service
            .update(second.id, patch.as_object().expect("object"))
            .await
            .expect("keeping its own identifier should succeed");
    }
}

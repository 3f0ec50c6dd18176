//! Query helpers shared by the entity services.
//!
//! This module contains the pieces every service needs: pagination, filter clause building,
//! id lookups, foreign-key checks, restricted deletes and partial-update merging.

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::models::timestamp::{self, TimeBound};
use crate::models::EntityKind;
use crate::{CoreError, CoreResult};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Encode, FromRow, QueryBuilder, Type};

// ============================================================================
// PAGINATION
// ============================================================================

/// Resolved `LIMIT`/`OFFSET` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Apply defaults and bounds to caller-supplied paging values.
    ///
    /// `limit` defaults to 20 and is clamped to 100; `offset` defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` for a limit below 1 or a negative offset.
    pub fn resolve(limit: Option<i64>, offset: Option<i64>) -> CoreResult<Self> {
        let limit = match limit {
            None => DEFAULT_PAGE_LIMIT,
            Some(l) if l < 1 => {
                return Err(CoreError::InvalidInput(
                    "limit must be at least 1".into(),
                ))
            }
            Some(l) => l.min(MAX_PAGE_LIMIT),
        };
        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(CoreError::InvalidInput("offset cannot be negative".into()))
            }
            Some(o) => o,
        };
        Ok(Self { limit, offset })
    }
}

// ============================================================================
// LIST QUERIES
// ============================================================================

/// `SELECT * FROM <table>` with filter clauses appended as they are supplied.
pub(crate) struct ListQuery<'a> {
    builder: QueryBuilder<'a, Sqlite>,
    has_where: bool,
}

impl<'a> ListQuery<'a> {
    pub(crate) fn new(kind: EntityKind) -> Self {
        Self {
            builder: QueryBuilder::new(format!("SELECT * FROM {}", kind.table())),
            has_where: false,
        }
    }

    fn clause(&mut self, column: &str) -> &mut QueryBuilder<'a, Sqlite> {
        self.builder
            .push(if self.has_where { " AND " } else { " WHERE " });
        self.has_where = true;
        self.builder.push(column)
    }

    /// `column = value` when a value is supplied.
    pub(crate) fn eq<T>(&mut self, column: &str, value: Option<T>)
    where
        T: 'a + Encode<'a, Sqlite> + Type<Sqlite> + Send,
    {
        if let Some(value) = value {
            self.clause(column).push(" = ").push_bind(value);
        }
    }

    /// Case-insensitive substring match.
    pub(crate) fn contains(&mut self, column: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.clause(column)
                .push(" LIKE ")
                .push_bind(like_pattern(value))
                .push(" ESCAPE '\\'");
        }
    }

    /// `column >= from` and `column <=/< to` for whichever bounds are supplied.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` naming the parameter that failed to parse.
    pub(crate) fn between(
        &mut self,
        column: &str,
        from: (&str, Option<&str>),
        to: (&str, Option<&str>),
    ) -> CoreResult<()> {
        if let (param, Some(raw)) = from {
            let start = timestamp::lower_bound(raw)
                .map_err(|e| CoreError::InvalidInput(format!("{param}: {e}")))?;
            self.clause(column).push(" >= ").push_bind(start);
        }
        if let (param, Some(raw)) = to {
            match timestamp::upper_bound(raw)
                .map_err(|e| CoreError::InvalidInput(format!("{param}: {e}")))?
            {
                TimeBound::Inclusive(end) => {
                    self.clause(column).push(" <= ").push_bind(end);
                }
                TimeBound::Exclusive(end) => {
                    self.clause(column).push(" < ").push_bind(end);
                }
            }
        }
        Ok(())
    }

    /// Order by primary key and fetch one page.
    pub(crate) async fn fetch_page<T>(mut self, pool: &SqlitePool, page: Page) -> CoreResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.builder
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows = self.builder.build_query_as::<T>().fetch_all(pool).await?;
        Ok(rows)
    }
}

/// Wrap a user value in `%...%`, escaping LIKE wildcards so they match literally.
pub(crate) fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ============================================================================
// ROW LOOKUPS
// ============================================================================

/// Fetch a row by primary key.
///
/// # Errors
///
/// Returns `CoreError::NotFound` if no row has that id.
pub(crate) async fn fetch_by_id<T>(pool: &SqlitePool, kind: EntityKind, id: i64) -> CoreResult<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE id = ?", kind.table());
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(CoreError::NotFound { entity: kind, id })
}

pub(crate) async fn exists(pool: &SqlitePool, kind: EntityKind, id: i64) -> CoreResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", kind.table());
    let found: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
    Ok(found)
}

/// Check that an optional reference points at an existing row.
///
/// # Errors
///
/// Returns `CoreError::ForeignKey` naming `field` when the referenced row is missing.
pub(crate) async fn ensure_reference(
    pool: &SqlitePool,
    field: &'static str,
    kind: EntityKind,
    id: Option<i64>,
) -> CoreResult<()> {
    match id {
        Some(id) if !exists(pool, kind, id).await? => Err(CoreError::ForeignKey {
            field,
            entity: kind,
            id,
        }),
        _ => Ok(()),
    }
}

/// Delete a row unless other rows still reference it.
///
/// # Errors
///
/// - `CoreError::NotFound` if the row does not exist,
/// - `CoreError::Conflict` naming the first dependent table that still points at it.
pub(crate) async fn delete_restricted(
    pool: &SqlitePool,
    kind: EntityKind,
    id: i64,
) -> CoreResult<()> {
    if !exists(pool, kind, id).await? {
        return Err(CoreError::NotFound { entity: kind, id });
    }

    for (dependent, column) in kind.dependents() {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            dependent.table(),
            column
        );
        let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
        if count > 0 {
            return Err(CoreError::Conflict(format!(
                "{} {} is still referenced by {} {}(s)",
                kind.singular(),
                id,
                count,
                dependent.singular()
            )));
        }
    }

    let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(CoreError::NotFound { entity: kind, id });
    }
    Ok(())
}

// ============================================================================
// PARTIAL UPDATES
// ============================================================================

/// Overlay the keys present in `patch` onto `current` and decode the result as a full payload.
///
/// An explicit `null` clears a nullable field. `id` is never taken from the patch and keys the
/// payload does not know are ignored.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if the merged object does not decode as `N`.
pub(crate) fn merge_patch<T, N>(current: &T, patch: &Map<String, Value>) -> CoreResult<N>
where
    T: Serialize,
    N: DeserializeOwned,
{
    let mut merged = match serde_json::to_value(current).map_err(CoreError::Serialization)? {
        Value::Object(map) => map,
        other => {
            return Err(CoreError::InvalidInput(format!(
                "stored record is not an object: {other}"
            )))
        }
    };

    for (key, value) in patch {
        if key != "id" {
            merged.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(Value::Object(merged))
        .map_err(|e| CoreError::InvalidInput(format!("invalid update: {e}")))
}

//! Relational store: one table per entity type, one column per serialized field.
//!
//! Tables are provisioned by the application. Rows are read through `row_to_json` and
//! written through `jsonb_populate_record`, so column typing stays with the database.

use super::{is_unique_violation, to_object, StorageBackend};
use crate::entity::{Entity, EntityMeta};
use crate::error::StoreError;
use crate::sql::{self, bind_all, QueryBuf};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Columns an update never writes.
const IMMUTABLE_COLUMNS: &[&str] = &["id", "creation_date"];

#[derive(Clone, Debug)]
pub struct RelationalStore {
    pool: PgPool,
    schema: String,
}

fn row_to_value(row: &PgRow) -> Result<serde_json::Value, StoreError> {
    Ok(row.try_get::<serde_json::Value, _>("row")?)
}

impl RelationalStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        RelationalStore {
            pool,
            schema: schema.to_string(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Active rows of `T`. `get` narrows this query, so anything added here applies to both.
    fn all_query<T: Entity>(&self) -> QueryBuf {
        sql::active_rows(&self.schema, T::TYPE_NAME)
    }

    async fn fetch_rows<T: Entity>(&self, q: &QueryBuf) -> Result<Vec<T>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| -> Result<T, StoreError> { Ok(serde_json::from_value(row_to_value(r)?)?) })
            .collect()
    }

    async fn exists<T: Entity>(&self, id: Uuid) -> Result<bool, StoreError> {
        let q = sql::count_active_by_id(&self.schema, T::TYPE_NAME, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let (count,): (i64,) = sqlx::query_as(&q.sql).bind(id).fetch_one(&self.pool).await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl StorageBackend for RelationalStore {
    async fn get_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        let q = self.all_query::<T>();
        self.fetch_rows(&q).await
    }

    async fn get<T: Entity>(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let q = self.all_query::<T>().and_id_eq(id).limit(1);
        Ok(self.fetch_rows(&q).await?.into_iter().next())
    }

    // Same check-then-insert window as the document store; the table's primary key
    // decides a same-id race and the loser reports a conflict.
    async fn create<T: Entity>(&self, mut entity: T) -> Result<Option<T>, StoreError> {
        if entity.meta().has_id() && self.exists::<T>(entity.id()).await? {
            return Ok(None);
        }
        if !entity.meta().has_id() {
            entity.meta_mut().id = Uuid::new_v4();
        }
        let row = serde_json::Value::Object(to_object(&entity)?);
        let q = sql::insert_row(&self.schema, T::TYPE_NAME, row);
        tracing::debug!(sql = %q.sql, "query");
        match bind_all(sqlx::query(&q.sql), &q.params).execute(&self.pool).await {
            Ok(_) => Ok(Some(entity)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update<T: Entity>(&self, id: Uuid, mut entity: T) -> Result<Option<T>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let lock = sql::lock_active_row(&self.schema, T::TYPE_NAME, id);
        tracing::debug!(sql = %lock.sql, params = ?lock.params, "query (tx)");
        let current = bind_all(sqlx::query(&lock.sql), &lock.params)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Ok(None);
        };
        let stored: EntityMeta = serde_json::from_value(row_to_value(&current)?)?;

        entity.meta_mut().prepare_replacement(id);
        entity.meta_mut().creation_date = stored.creation_date;
        let object = to_object(&entity)?;
        let columns: Vec<&str> = object
            .keys()
            .map(String::as_str)
            .filter(|k| !IMMUTABLE_COLUMNS.contains(k))
            .collect();
        let q = sql::update_row(
            &self.schema,
            T::TYPE_NAME,
            id,
            &columns,
            serde_json::Value::Object(object.clone()),
        );
        tracing::debug!(sql = %q.sql, "query (tx)");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_one(&mut *tx)
            .await?;
        let replaced: T = serde_json::from_value(row_to_value(&row)?)?;
        tx.commit().await?;
        Ok(Some(replaced))
    }
}

//! Document store: one JSONB collection per entity type.

use super::{is_unique_violation, to_object, StorageBackend};
use crate::entity::Entity;
use crate::error::StoreError;
use crate::sql::{self, bind_all, QueryBuf};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct DocumentStore {
    pool: PgPool,
    schema: String,
}

impl DocumentStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        DocumentStore {
            pool,
            schema: schema.to_string(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the collection for `T` if it does not exist yet.
    pub async fn ensure_collection<T: Entity>(&self) -> Result<(), StoreError> {
        let ddl = sql::create_collection(&self.schema, T::TYPE_NAME);
        tracing::debug!(sql = %ddl, "query");
        sqlx::query(&ddl).execute(&self.pool).await?;
        tracing::info!(collection = T::TYPE_NAME, schema = %self.schema, "collection ready");
        Ok(())
    }

    /// Active documents of `T`. `get` narrows this query, so anything added here applies to both.
    fn all_query<T: Entity>(&self) -> QueryBuf {
        sql::active_documents(&self.schema, T::TYPE_NAME)
    }

    async fn fetch_documents<T: Entity>(&self, q: &QueryBuf) -> Result<Vec<T>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| -> Result<T, StoreError> {
                let doc: serde_json::Value = r.try_get("document")?;
                Ok(serde_json::from_value(doc)?)
            })
            .collect()
    }
}

#[async_trait]
impl StorageBackend for DocumentStore {
    async fn get_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        let q = self.all_query::<T>();
        self.fetch_documents(&q).await
    }

    async fn get<T: Entity>(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let q = self.all_query::<T>().and_id_eq(id).limit(1);
        Ok(self.fetch_documents(&q).await?.into_iter().next())
    }

    // The existence check and the insert are separate statements. Two creates racing on the
    // same id can both pass the check; the collection's primary key rejects the second
    // insert, which is reported as a conflict.
    async fn create<T: Entity>(&self, mut entity: T) -> Result<Option<T>, StoreError> {
        if entity.meta().has_id() && self.get::<T>(entity.id()).await?.is_some() {
            return Ok(None);
        }
        if !entity.meta().has_id() {
            entity.meta_mut().id = Uuid::new_v4();
        }
        let document = serde_json::Value::Object(to_object(&entity)?);
        let q = sql::insert_document(&self.schema, T::TYPE_NAME, entity.id(), document);
        tracing::debug!(sql = %q.sql, "query");
        match bind_all(sqlx::query(&q.sql), &q.params).execute(&self.pool).await {
            Ok(_) => Ok(Some(entity)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update<T: Entity>(&self, id: Uuid, mut entity: T) -> Result<Option<T>, StoreError> {
        entity.meta_mut().prepare_replacement(id);
        let document = serde_json::Value::Object(to_object(&entity)?);
        let q = sql::replace_document(&self.schema, T::TYPE_NAME, id, document);
        tracing::debug!(sql = %q.sql, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => {
                let doc: serde_json::Value = r.try_get("document")?;
                Ok(Some(serde_json::from_value(doc)?))
            }
            None => Ok(None),
        }
    }
}

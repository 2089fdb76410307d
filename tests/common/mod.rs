//! Shared test entity and store setup.

#![allow(dead_code)]

use entity_sdk::schema::{Annotation, InputType};
use entity_sdk::{DocumentStore, Entity, EntityMeta, FieldSpec, FilesystemStore, RelationalStore, Rule};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

impl Entity for Task {
    const TYPE_NAME: &'static str = "Task";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::of::<String>("name")
                .rule(Rule::required())
                .rule(Rule::max_length(40))
                .annotate(Annotation::preferred_input(InputType::Text)),
            FieldSpec::of::<bool>("done"),
        ]
    }
}

pub fn task(name: &str) -> Task {
    Task {
        meta: EntityMeta::new(),
        name: name.into(),
        done: false,
    }
}

pub async fn filesystem_store() -> (tempfile::TempDir, FilesystemStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FilesystemStore::open(dir.path()).await.unwrap();
    (dir, store)
}

/// PostgreSQL pool for the SQL backends, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn test_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .unwrap();
    Some(pool)
}

/// A fresh schema per test so runs never see each other's rows.
pub async fn fresh_schema(pool: &sqlx::PgPool) -> String {
    let schema = format!("t_{}", uuid::Uuid::new_v4().simple());
    entity_sdk::store::ensure_schema(pool, &schema).await.unwrap();
    schema
}

pub async fn document_store() -> Option<DocumentStore> {
    let pool = test_pool().await?;
    let schema = fresh_schema(&pool).await;
    let store = DocumentStore::new(pool, &schema);
    store.ensure_collection::<Task>().await.unwrap();
    Some(store)
}

pub async fn relational_store() -> Option<RelationalStore> {
    let pool = test_pool().await?;
    let schema = fresh_schema(&pool).await;
    sqlx::query(&format!(
        "CREATE TABLE \"{}\".\"Task\" (\
         id UUID PRIMARY KEY, \
         creation_date TIMESTAMPTZ NOT NULL, \
         last_update_date TIMESTAMPTZ NOT NULL, \
         deletion_date TIMESTAMPTZ, \
         name TEXT NOT NULL, \
         done BOOLEAN NOT NULL DEFAULT FALSE)",
        schema
    ))
    .execute(&pool)
    .await
    .unwrap();
    Some(RelationalStore::new(pool, &schema))
}

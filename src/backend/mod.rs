//! Storage backends: one CRUD contract, three interchangeable stores.
//!
//! Every backend honors the same invariants: reads and the create-time existence check see
//! only active entities, updates replace the full record, and nothing is ever erased.
//! Conflict and NotFound are reported as `None`, never as errors.

mod document;
mod filesystem;
mod relational;

pub use document::DocumentStore;
pub use filesystem::FilesystemStore;
pub use relational::RelationalStore;

use crate::config::{BackendKind, StoreConfig};
use crate::entity::Entity;
use crate::error::{AppError, StoreError};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Snapshot of every active entity of `T`, in backend order.
    async fn get_all<T: Entity>(&self) -> Result<Vec<T>, StoreError>;

    /// The active entity with `id`, if any.
    async fn get<T: Entity>(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    /// Persist a new entity, assigning an id when it has none.
    /// Returns `None` when a non-nil id is already held by an active entity.
    async fn create<T: Entity>(&self, entity: T) -> Result<Option<T>, StoreError>;

    /// Replace the active entity at `id`. The payload's id is ignored, `last_update_date`
    /// is stamped and the stored `creation_date` is kept. Returns `None` when nothing
    /// active exists at `id`.
    async fn update<T: Entity>(&self, id: Uuid, entity: T) -> Result<Option<T>, StoreError>;
}

/// Serialize an entity into the JSON object every backend persists.
pub(crate) fn to_object<T: Entity>(entity: &T) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
    match serde_json::to_value(entity)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject { type_name: T::TYPE_NAME }),
    }
}

/// A primary-key collision on insert: the loser of a concurrent same-id create.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// The backend chosen by configuration.
#[derive(Clone, Debug)]
pub enum Backend {
    Document(DocumentStore),
    Relational(RelationalStore),
    Filesystem(FilesystemStore),
}

impl Backend {
    /// Open the configured store. SQL backends connect (creating the database and schema
    /// when missing); the filesystem backend creates its directory.
    pub async fn from_config(config: &StoreConfig) -> Result<Self, AppError> {
        crate::config::validate(config)?;
        Ok(match config.backend {
            BackendKind::Document => {
                let pool = crate::store::connect(config).await?;
                Backend::Document(DocumentStore::new(pool, &config.schema))
            }
            BackendKind::Relational => {
                let pool = crate::store::connect(config).await?;
                Backend::Relational(RelationalStore::new(pool, &config.schema))
            }
            BackendKind::Filesystem => {
                Backend::Filesystem(FilesystemStore::open(&config.data_dir).await?)
            }
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Document(_) => BackendKind::Document,
            Backend::Relational(_) => BackendKind::Relational,
            Backend::Filesystem(_) => BackendKind::Filesystem,
        }
    }
}

#[async_trait]
impl StorageBackend for Backend {
    async fn get_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        match self {
            Backend::Document(b) => b.get_all::<T>().await,
            Backend::Relational(b) => b.get_all::<T>().await,
            Backend::Filesystem(b) => b.get_all::<T>().await,
        }
    }

    async fn get<T: Entity>(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self {
            Backend::Document(b) => b.get::<T>(id).await,
            Backend::Relational(b) => b.get::<T>(id).await,
            Backend::Filesystem(b) => b.get::<T>(id).await,
        }
    }

    async fn create<T: Entity>(&self, entity: T) -> Result<Option<T>, StoreError> {
        match self {
            Backend::Document(b) => b.create(entity).await,
            Backend::Relational(b) => b.create(entity).await,
            Backend::Filesystem(b) => b.create(entity).await,
        }
    }

    async fn update<T: Entity>(&self, id: Uuid, entity: T) -> Result<Option<T>, StoreError> {
        match self {
            Backend::Document(b) => b.update(id, entity).await,
            Backend::Relational(b) => b.update(id, entity).await,
            Backend::Filesystem(b) => b.update(id, entity).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[tokio::test]
    async fn filesystem_config_opens_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("entities");
        let backend = Backend::from_config(&StoreConfig::filesystem(&data)).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Filesystem);
        assert!(data.is_dir());
    }

    #[tokio::test]
    async fn sql_config_without_url_is_rejected() {
        let mut config = StoreConfig::filesystem("unused");
        config.backend = BackendKind::Relational;
        let err = Backend::from_config(&config).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Missing(_))));
    }
}

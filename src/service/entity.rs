//! Uniform entity façade over the active storage backend.

use crate::backend::StorageBackend;
use crate::entity::{now, Entity};
use crate::error::StoreError;
use crate::schema::{model_of, SchemaDocument};
use std::sync::Arc;
use uuid::Uuid;

/// The only component callers talk to. Persistence goes to `B`; schema export goes to the
/// process-wide schema cache and never touches the backend.
#[derive(Clone, Debug)]
pub struct EntityService<B> {
    backend: B,
}

impl<B: StorageBackend> EntityService<B> {
    pub fn new(backend: B) -> Self {
        EntityService { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Schema document for `T`, computed on first use and cached per type for the
    /// lifetime of the process (shared across service instances).
    pub fn generate_model<T: Entity>(&self) -> Arc<SchemaDocument> {
        model_of::<T>()
    }

    /// Point-in-time snapshot of all active entities. Order is backend-defined.
    pub async fn get_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        self.backend.get_all::<T>().await
    }

    pub async fn get<T: Entity>(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        self.backend.get::<T>(id).await
    }

    /// `Ok(None)` means an active entity already holds the entity's (non-nil) id.
    pub async fn create<T: Entity>(&self, entity: T) -> Result<Option<T>, StoreError> {
        self.backend.create(entity).await
    }

    /// Full-record replacement. `Ok(None)` means no active entity exists at `id`.
    pub async fn update<T: Entity>(&self, id: Uuid, entity: T) -> Result<Option<T>, StoreError> {
        self.backend.update(id, entity).await
    }

    /// Soft delete: stamp `deletion_date` and go through `update`, so deletion shares the
    /// update path on every backend. False when nothing active exists at `id`.
    pub async fn delete<T: Entity>(&self, id: Uuid) -> Result<bool, StoreError> {
        let Some(mut entity) = self.backend.get::<T>(id).await? else {
            return Ok(false);
        };
        entity.meta_mut().deletion_date = Some(now());
        Ok(self.backend.update(id, entity).await?.is_some())
    }
}

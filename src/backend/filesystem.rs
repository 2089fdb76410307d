//! Filesystem store: one JSON file per entity, `{id}.{TYPE_NAME}.entity.json`, in one flat
//! directory. No index and no locking; meant for tests and local development only.

use super::StorageBackend;
use crate::entity::Entity;
use crate::error::StoreError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FILE_SUFFIX: &str = "entity.json";

#[derive(Clone, Debug)]
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    /// Use `dir` as the store directory, creating it if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!(dir = %dir.display(), "filesystem store ready");
        Ok(FilesystemStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `.{TYPE_NAME}.entity.json`, once the type name is known to stay one path segment
    /// that no other type's suffix can end with.
    fn extension<T: Entity>() -> Result<String, StoreError> {
        if T::TYPE_NAME.is_empty() || T::TYPE_NAME.contains(['.', '/', '\\']) {
            return Err(StoreError::InvalidTypeName { type_name: T::TYPE_NAME });
        }
        Ok(format!(".{}.{}", T::TYPE_NAME, FILE_SUFFIX))
    }

    pub fn file_name<T: Entity>(&self, id: Uuid) -> Result<PathBuf, StoreError> {
        Ok(self.dir.join(format!("{}{}", id, Self::extension::<T>()?)))
    }

    /// Id of a file belonging to `T`; `None` for anything else in the directory.
    fn id_of(file_name: &str, extension: &str) -> Option<Uuid> {
        file_name
            .strip_suffix(extension)
            .and_then(|stem| Uuid::parse_str(stem).ok())
    }

    async fn load<T: Entity>(path: &Path) -> Result<T, StoreError> {
        tracing::debug!(path = %path.display(), "read entity");
        let raw = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn save<T: Entity>(&self, entity: &T) -> Result<(), StoreError> {
        let path = self.file_name::<T>(entity.id())?;
        tracing::debug!(path = %path.display(), "write entity");
        let raw = serde_json::to_vec(entity)?;
        tokio::fs::write(&path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemStore {
    /// Scans the directory on every call and reads each matching file.
    async fn get_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        let extension = Self::extension::<T>()?;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let owned = entry
                .file_name()
                .to_str()
                .and_then(|name| Self::id_of(name, &extension))
                .is_some();
            if !owned {
                continue;
            }
            let entity: T = Self::load(&entry.path()).await?;
            if entity.is_active() {
                out.push(entity);
            }
        }
        Ok(out)
    }

    /// Direct path lookup; never scans the directory.
    async fn get<T: Entity>(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let path = self.file_name::<T>(id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let entity: T = Self::load(&path).await?;
        Ok(entity.is_active().then_some(entity))
    }

    async fn create<T: Entity>(&self, mut entity: T) -> Result<Option<T>, StoreError> {
        if entity.meta().has_id() && self.get::<T>(entity.id()).await?.is_some() {
            return Ok(None);
        }
        if !entity.meta().has_id() {
            entity.meta_mut().id = Uuid::new_v4();
        }
        self.save(&entity).await?;
        Ok(Some(entity))
    }

    async fn update<T: Entity>(&self, id: Uuid, mut entity: T) -> Result<Option<T>, StoreError> {
        let Some(current) = self.get::<T>(id).await? else {
            return Ok(None);
        };
        entity.meta_mut().prepare_replacement(id);
        entity.meta_mut().creation_date = current.meta().creation_date;
        self.save(&entity).await?;
        Ok(Some(entity))
    }
}

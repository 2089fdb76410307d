//! Entity SDK: one CRUD contract over document, relational and filesystem stores,
//! plus a cached schema document per entity type.

pub mod backend;
pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use backend::{Backend, DocumentStore, FilesystemStore, RelationalStore, StorageBackend};
pub use config::{BackendKind, StoreConfig};
pub use entity::{Entity, EntityMeta};
pub use error::{AppError, ConfigError, StoreError};
pub use logging::init_tracing;
pub use routes::{common_routes, entity_routes};
pub use schema::{Annotation, FieldSpec, FieldType, InputType, Rule, SchemaDocument};
pub use service::{EntityService, RequestValidator};
pub use state::AppState;
pub use store::{connect, ensure_database_exists};

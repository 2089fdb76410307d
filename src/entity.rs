//! Base record shape shared by every stored type: identity plus lifecycle timestamps.

use crate::schema::FieldSpec;
use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current wall-clock time at microsecond precision, the resolution PostgreSQL keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Identity and lifecycle columns. Embed with `#[serde(flatten)]` in every entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// `Uuid::nil()` until a backend assigns one.
    #[serde(default)]
    pub id: Uuid,
    #[serde(default = "now")]
    pub creation_date: DateTime<Utc>,
    #[serde(default = "now")]
    pub last_update_date: DateTime<Utc>,
    /// `None` while the record is active.
    #[serde(default)]
    pub deletion_date: Option<DateTime<Utc>>,
}

impl EntityMeta {
    pub fn new() -> Self {
        let ts = now();
        EntityMeta {
            id: Uuid::nil(),
            creation_date: ts,
            last_update_date: ts,
            deletion_date: None,
        }
    }

    pub fn with_id(id: Uuid) -> Self {
        EntityMeta { id, ..Self::new() }
    }

    pub fn is_active(&self) -> bool {
        self.deletion_date.is_none()
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }

    /// Prepare an incoming record to replace the stored one at `id`: the path id wins over
    /// whatever the payload carried, and the update is stamped.
    pub fn prepare_replacement(&mut self, id: Uuid) {
        self.id = id;
        self.last_update_date = now();
    }

    /// Declared schema fields of the base record, appended after the entity's own fields.
    pub fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::of::<Uuid>("id"),
            FieldSpec::of::<DateTime<Utc>>("creation_date"),
            FieldSpec::of::<DateTime<Utc>>("last_update_date"),
            FieldSpec::of::<Option<DateTime<Utc>>>("deletion_date"),
        ]
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// A type that can be stored by any backend.
///
/// `TYPE_NAME` names the document collection, the relational table and the file suffix
/// (`{id}.{TYPE_NAME}.entity.json`). `fields` declares the schema in declaration order.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// The type's own fields, excluding the base `EntityMeta` ones.
    fn fields() -> Vec<FieldSpec>;

    fn id(&self) -> Uuid {
        self.meta().id
    }

    fn is_active(&self) -> bool {
        self.meta().is_active()
    }
}

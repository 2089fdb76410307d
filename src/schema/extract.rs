//! Builds the client-facing schema document for an entity type and caches it per type.

use super::field::FieldSpec;
use super::rule::{Annotation, Rule};
use crate::case::to_camel_case;
use crate::entity::{Entity, EntityMeta};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchemaDocument {
    pub properties: Vec<PropertySchema>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertySchema {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub validations: Vec<ValidationSchema>,
    /// Enumeration options for dropdown/radio rendering.
    pub payload: Option<Vec<String>>,
    #[serde(rename = "additionalAttributes")]
    pub other_annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub error_message: String,
    pub payload: Option<Value>,
}

impl From<&Rule> for ValidationSchema {
    fn from(rule: &Rule) -> Self {
        ValidationSchema {
            kind: rule.name(),
            error_message: rule.message_template(),
            payload: rule.payload(),
        }
    }
}

impl From<&FieldSpec> for PropertySchema {
    fn from(field: &FieldSpec) -> Self {
        PropertySchema {
            name: to_camel_case(field.name()).to_lowercase(),
            declared_type: field.declared_type().to_string(),
            validations: field.rules().iter().map(ValidationSchema::from).collect(),
            payload: field
                .enum_variants()
                .map(|names| names.iter().map(|n| n.to_string()).collect()),
            other_annotations: field.annotations().to_vec(),
        }
    }
}

/// Declared fields of `T` followed by the base entity fields.
pub fn declared_fields<T: Entity>() -> Vec<FieldSpec> {
    let mut fields = T::fields();
    fields.extend(EntityMeta::fields());
    fields
}

/// Compute the schema document for `T`. Pure; prefer [`model_of`] which caches.
pub fn extract<T: Entity>() -> SchemaDocument {
    SchemaDocument {
        properties: declared_fields::<T>().iter().map(PropertySchema::from).collect(),
    }
}

static MODEL_CACHE: Lazy<RwLock<HashMap<TypeId, Arc<SchemaDocument>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Cached schema for `T`. Concurrent first callers may each compute it; the value is
/// identical so whichever insert lands last is kept.
pub fn model_of<T: Entity>() -> Arc<SchemaDocument> {
    let key = TypeId::of::<T>();
    if let Ok(cache) = MODEL_CACHE.read() {
        if let Some(doc) = cache.get(&key) {
            return Arc::clone(doc);
        }
    }
    let doc = Arc::new(extract::<T>());
    tracing::debug!(entity = T::TYPE_NAME, "schema computed");
    match MODEL_CACHE.write() {
        Ok(mut cache) => Arc::clone(cache.entry(key).or_insert(doc)),
        Err(_) => doc,
    }
}

//! Schema export: declared fields and validation rules normalized into one wire format.

mod extract;
mod field;
mod rule;

pub use extract::{declared_fields, extract, model_of, PropertySchema, SchemaDocument, ValidationSchema};
pub use field::{short_type_name, FieldSpec, FieldType};
pub use rule::{normalize_name, Annotation, InputType, Rule, RuleKind};

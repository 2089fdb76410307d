//! HTTP handlers for entity CRUD and schema export.

pub mod entity;
pub use entity::*;

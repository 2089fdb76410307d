//! EntityService: backend-agnostic CRUD plus schema export, and request validation.

mod entity;
mod validation;
pub use entity::EntityService;
pub use validation::RequestValidator;

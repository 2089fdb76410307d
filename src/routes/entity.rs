//! Entity CRUD routes for one entity type. Nest the router under the type's path.

use crate::backend::StorageBackend;
use crate::entity::Entity;
use crate::error::AppError;
use crate::handlers::entity::{create, delete as delete_handler, list, model, read, update};
use crate::service::EntityService;
use crate::state::AppState;
use axum::{
    http::{header, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// A declared Content-Length over the limit is answered by the limit layer itself with a
/// plain-text 413; rewrite it into the JSON error envelope.
async fn envelope_oversized(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.as_bytes().starts_with(b"application/json"))
        .unwrap_or(false);
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return AppError::PayloadTooLarge("request body exceeds the configured limit".into()).into_response();
    }
    response
}

pub fn entity_routes<T, B>(service: Arc<EntityService<B>>, body_limit: usize) -> Router
where
    T: Entity + Default,
    B: StorageBackend + 'static,
{
    Router::new()
        .route("/", get(list::<T, B>).post(create::<T, B>))
        .route("/model", get(model::<T, B>))
        .route(
            "/:id",
            get(read::<T, B>).put(update::<T, B>).delete(delete_handler::<T, B>),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(map_response(envelope_oversized))
        .with_state(AppState { service })
}

//! Entity CRUD handlers, generic over the entity type and the storage backend.

use crate::backend::StorageBackend;
use crate::case::value_keys_to_snake_case_recursive;
use crate::entity::Entity;
use crate::error::AppError;
use crate::response::{paginate, to_api_value, PageParams};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ModelParams {
    #[serde(default)]
    pub example: bool,
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// camelCase request body -> validated snake_case map -> `T`.
fn parse_body<T: Entity>(mut body: Value) -> Result<T, AppError> {
    value_keys_to_snake_case_recursive(&mut body);
    let map = body_to_map(body)?;
    RequestValidator::validate(&map, &T::fields())?;
    serde_json::from_value(Value::Object(map)).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn not_found<T: Entity>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {}", T::TYPE_NAME, id))
}

pub async fn list<T, B>(
    State(state): State<AppState<B>>,
    Query(params): Query<PageParams>,
) -> Result<Response, AppError>
where
    T: Entity,
    B: StorageBackend + 'static,
{
    let rows = state.service.get_all::<T>().await?;
    let items = rows.iter().map(to_api_value).collect::<Result<Vec<_>, _>>()?;
    if !params.is_paged() {
        return Ok(Json(items).into_response());
    }
    Ok(Json(paginate(items, &params)?).into_response())
}

pub async fn model<T, B>(
    State(state): State<AppState<B>>,
    Query(params): Query<ModelParams>,
) -> Result<Response, AppError>
where
    T: Entity + Default,
    B: StorageBackend + 'static,
{
    if params.example {
        return Ok(Json(to_api_value(&T::default())?).into_response());
    }
    let schema = state.service.generate_model::<T>();
    Ok(Json(schema.as_ref().clone()).into_response())
}

pub async fn read<T, B>(State(state): State<AppState<B>>, Path(id): Path<Uuid>) -> Result<Response, AppError>
where
    T: Entity,
    B: StorageBackend + 'static,
{
    let row = state.service.get::<T>(id).await?.ok_or_else(|| not_found::<T>(id))?;
    Ok(Json(to_api_value(&row)?).into_response())
}

pub async fn create<T, B>(
    State(state): State<AppState<B>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError>
where
    T: Entity,
    B: StorageBackend + 'static,
{
    let Json(body) = body?;
    let entity: T = parse_body(body)?;
    let requested = entity.id();
    let row = state
        .service
        .create(entity)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("{} {} already exists", T::TYPE_NAME, requested)))?;
    tracing::debug!(entity = T::TYPE_NAME, id = %row.id(), "created");
    Ok((StatusCode::CREATED, Json(to_api_value(&row)?)).into_response())
}

/// A nil path id falls back to the id carried in the payload.
pub async fn update<T, B>(
    State(state): State<AppState<B>>,
    Path(id): Path<Uuid>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError>
where
    T: Entity,
    B: StorageBackend + 'static,
{
    let Json(body) = body?;
    let entity: T = parse_body(body)?;
    let id = if id.is_nil() { entity.id() } else { id };
    let row = state.service.update(id, entity).await?.ok_or_else(|| not_found::<T>(id))?;
    Ok(Json(to_api_value(&row)?).into_response())
}

pub async fn delete<T, B>(State(state): State<AppState<B>>, Path(id): Path<Uuid>) -> Result<Response, AppError>
where
    T: Entity,
    B: StorageBackend + 'static,
{
    if !state.service.delete::<T>(id).await? {
        return Err(not_found::<T>(id));
    }
    tracing::debug!(entity = T::TYPE_NAME, id = %id, "deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

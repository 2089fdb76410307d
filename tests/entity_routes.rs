//! HTTP surface over the filesystem backend, driven with `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{filesystem_store, Task};
use entity_sdk::{common_routes, entity_routes, EntityService, FilesystemStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> (tempfile::TempDir, Router) {
    let (dir, store) = filesystem_store().await;
    let service: Arc<EntityService<FilesystemStore>> = Arc::new(EntityService::new(store));
    let router = Router::new()
        .merge(common_routes())
        .nest("/api/tasks", entity_routes::<Task, _>(service, 1024));
    (dir, router)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    read(app, request).await
}

/// Non-JSON bodies come back as `Value::String`, an empty body as `Value::Null`.
async fn read(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

#[tokio::test]
async fn crud_lifecycle() {
    let (_dir, app) = app().await;

    let (status, created) = send(&app, "POST", "/api/tasks", Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created["creationDate"].is_string());
    assert!(created["deletionDate"].is_null());

    let (status, fetched) = send(&app, "GET", &format!("/api/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", id),
        Some(json!({ "name": "y", "done": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "y");
    assert_eq!(updated["creationDate"], created["creationDate"]);

    let (status, _) = send(&app, "DELETE", &format!("/api/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/api/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, "GET", &format!("/api/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (_, all) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn create_rejects_invalid_and_duplicate_bodies() {
    let (_dir, app) = app().await;

    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({ "done": true }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "validation: The name field is required.");

    let (status, _) = send(&app, "POST", "/api/tasks", Some(json!(["not", "an", "object"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = uuid::Uuid::new_v4();
    let payload = json!({ "id": id, "name": "first" });
    let (status, _) = send(&app, "POST", "/api/tasks", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/api/tasks", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn update_with_nil_path_id_uses_payload_id() {
    let (_dir, app) = app().await;
    let (_, created) = send(&app, "POST", "/api/tasks", Some(json!({ "name": "x" }))).await;
    let nil = uuid::Uuid::nil();
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", nil),
        Some(json!({ "id": created["id"], "name": "z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["name"], "z");

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "PUT", &format!("/api/tasks/{}", missing), Some(json!({ "name": "z" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_paginates_on_request() {
    let (_dir, app) = app().await;
    for i in 0..5 {
        send(&app, "POST", "/api/tasks", Some(json!({ "name": format!("t{}", i) }))).await;
    }
    let (_, all) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(all.as_array().unwrap().len(), 5);

    let (status, page) = send(&app, "GET", "/api/tasks?page=1&pageSize=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let (_, last) = send(&app, "GET", "/api/tasks?page=2&pageSize=2", None).await;
    assert_eq!(last["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn model_endpoint_serves_schema_and_example() {
    let (_dir, app) = app().await;
    let (status, model) = send(&app, "GET", "/api/tasks/model", None).await;
    assert_eq!(status, StatusCode::OK);
    let first = &model["properties"][0];
    assert_eq!(first["name"], "name");
    assert_eq!(first["type"], "String");
    assert_eq!(first["validations"][0]["type"], "Required");
    assert_eq!(first["validations"][0]["errorMessage"], "The {0} field is required.");
    assert_eq!(first["additionalAttributes"][0]["name"], "PreferredInput");

    let (status, example) = send(&app, "GET", "/api/tasks/model?example=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(example["name"], "");
    assert_eq!(example["done"], false);
    assert!(example.get("lastUpdateDate").is_some());
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let (_dir, app) = app().await;
    let big = "a".repeat(4096);
    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({ "name": big }))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "payload_too_large");
}

#[tokio::test]
async fn declared_oversized_length_gets_error_envelope() {
    let (_dir, app) = app().await;
    let payload = json!({ "name": "a".repeat(4096) }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = read(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "payload_too_large");
}

#[tokio::test]
async fn malformed_json_gets_error_envelope() {
    let (_dir, app) = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = read(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn health_and_version() {
    let (_dir, app) = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (_, body) = send(&app, "GET", "/version", None).await;
    assert_eq!(body["name"], "entity-sdk");
}

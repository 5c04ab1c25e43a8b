//! In-process API tests against the in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use contacts_server::{
    api::create_router,
    models::contact::{Contact, ContactId, ContactPatch, InsertAck, NewContact, UpdateOutcome},
    repository::{ContactStore, InMemoryContactStore, StoreError, StoreResult},
    services::Services,
    AppConfig, AppState,
};

const UNKNOWN_ID: &str = "65f1c0a2b4d3e8a1f2c3d4e5";

fn app_with(store: Arc<dyn ContactStore>) -> Router {
    create_router(AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(Services::new(store)),
    })
}

fn app() -> Router {
    app_with(Arc::new(InMemoryContactStore::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    send_request(app, request).await
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

fn ada() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com"
    })
}

async fn create(app: &Router, body: Value) -> String {
    let (status, body) = send(app, Method::POST, "/contacts", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["insertedId"].as_str().expect("No inserted ID").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app(), Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_then_get() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/contacts", Some(ada())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["acknowledged"], true);
    let id = body["insertedId"].as_str().expect("No inserted ID");
    assert_eq!(id.len(), 24);

    let (status, body) = send(&app, Method::GET, &format!("/contacts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], id);
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["lastName"], "Lovelace");
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("favoriteColor").is_none());
}

#[tokio::test]
async fn test_list_contacts() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create(&app, ada()).await;
    create(
        &app,
        json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "favoriteColor": "navy",
            "birthday": "1906-12-09"
        }),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body.as_array().expect("Expected an array");
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[1]["favoriteColor"], "navy");
    assert_eq!(contacts[1]["birthday"], "1906-12-09");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/contacts/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Invalid contact ID" }));

    let (status, body) = send(&app, Method::DELETE, "/contacts/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid contact ID");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/contacts/12345",
        Some(json!({ "favoriteColor": "red" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["param"], "id");
    assert_eq!(body["errors"][0]["location"], "params");
    assert_eq!(body["errors"][0]["msg"], "Invalid contact ID");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = app();
    let uri = format!("/contacts/{}", UNKNOWN_ID);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contact not found");

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "lastName": "Byron" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_validation_errors() {
    let store = Arc::new(InMemoryContactStore::new());
    let app = app_with(store.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/contacts",
        Some(json!({ "lastName": "Lovelace", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let errors = body["errors"].as_array().expect("Expected errors array");
    let params: Vec<&str> = errors.iter().filter_map(|e| e["param"].as_str()).collect();
    assert_eq!(params, vec!["email", "firstName"]);
    assert_eq!(errors[0]["msg"], "Valid email is required");
    assert_eq!(errors[0]["location"], "body");
    assert_eq!(errors[1]["msg"], "First name is required");

    let (status, body) = send(&app, Method::POST, "/contacts", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(3));

    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_null_required_field_is_field_error() {
    let store = Arc::new(InMemoryContactStore::new());
    let app = app_with(store.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/contacts",
        Some(json!({ "firstName": null, "lastName": "L", "email": "a@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().expect("Expected errors array");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["param"], "firstName");
    assert_eq!(errors[0]["msg"], "First name is required");
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_missing_body_is_field_errors() {
    let store = Arc::new(InMemoryContactStore::new());
    let app = app_with(store.clone());

    // No body and no content type
    let (status, body) = send(&app, Method::POST, "/contacts", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let params: Vec<&str> = body["errors"]
        .as_array()
        .expect("Expected errors array")
        .iter()
        .filter_map(|e| e["param"].as_str())
        .collect();
    assert_eq!(params, vec!["email", "firstName", "lastName"]);

    // A body that is not declared as JSON is not parsed
    let request = Request::builder()
        .method(Method::POST)
        .uri("/contacts")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(ada().to_string()))
        .expect("Failed to build request");
    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(3));

    assert_eq!(store.len().await, 0);

    // An update without a body changes nothing
    let id = create(&app, ada()).await;
    let uri = format!("/contacts/{}", id);
    let (status, _) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["firstName"], "Ada");
}

#[tokio::test]
async fn test_email_without_tld_is_rejected() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/contacts",
        Some(json!({ "firstName": "Ada", "lastName": "Lovelace", "email": "ada@localhost" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["param"], "email");
    assert_eq!(body["errors"][0]["msg"], "Valid email is required");
    assert_eq!(body["errors"][0]["value"], "ada@localhost");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/contacts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"firstName\": "))
        .expect("Failed to build request");
    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Malformed JSON body" }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/contacts",
        Some(json!({ "firstName": 42, "lastName": "Lovelace", "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_partial_update() {
    let app = app();
    let id = create(&app, ada()).await;
    let uri = format!("/contacts/{}", id);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "favoriteColor": "green" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact updated successfully.");

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["favoriteColor"], "green");
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["lastName"], "Lovelace");
    assert_eq!(body["email"], "ada@example.com");

    // Empty values keep the stored ones
    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "birthday": "", "favoriteColor": "" }))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["favoriteColor"], "green");
    assert!(body.get("birthday").is_none());

    // Identical values are a successful no-op
    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "favoriteColor": "green" }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_validation_errors() {
    let app = app();
    let id = create(&app, ada()).await;
    let uri = format!("/contacts/{}", id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "firstName": "", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().expect("Expected errors array");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[1]["msg"], "First name cannot be empty");

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_delete_twice() {
    let app = app();
    let id = create(&app, ada()).await;
    let uri = format!("/contacts/{}", id);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact deleted successfully.");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contact not found.");

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(&app(), Method::GET, "/people", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/contacts/{id}"].is_object());
}

/// Store whose every call fails with a driver-style message
struct FailingStore;

const DRIVER_DETAIL: &str = "connection reset by peer at 10.0.0.7:27017";

fn driver_failure<T>() -> StoreResult<T> {
    Err(StoreError::Backend(DRIVER_DETAIL.to_string()))
}

#[async_trait]
impl ContactStore for FailingStore {
    async fn ping(&self) -> StoreResult<()> {
        driver_failure()
    }

    async fn find_all(&self) -> StoreResult<Vec<Contact>> {
        driver_failure()
    }

    async fn find_by_id(&self, _id: &ContactId) -> StoreResult<Option<Contact>> {
        driver_failure()
    }

    async fn insert(&self, _contact: &NewContact) -> StoreResult<InsertAck> {
        driver_failure()
    }

    async fn update(&self, _id: &ContactId, _patch: &ContactPatch) -> StoreResult<UpdateOutcome> {
        driver_failure()
    }

    async fn delete(&self, _id: &ContactId) -> StoreResult<u64> {
        driver_failure()
    }
}

#[tokio::test]
async fn test_storage_failures_hide_driver_detail() {
    let app = app_with(Arc::new(FailingStore));
    let uri = format!("/contacts/{}", UNKNOWN_ID);

    let cases = [
        (Method::GET, "/contacts", None, "Internal server error while fetching contacts."),
        (Method::GET, uri.as_str(), None, "Internal server error while fetching contact."),
        (Method::POST, "/contacts", Some(ada()), "Internal server error while creating contact."),
        (
            Method::PUT,
            uri.as_str(),
            Some(json!({ "favoriteColor": "red" })),
            "Internal server error while updating contact.",
        ),
        (Method::DELETE, uri.as_str(), None, "Internal server error while deleting contact."),
    ];

    for (method, path, body, message) in cases {
        let (status, body) = send(&app, method.clone(), path, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, path);
        assert_eq!(body, json!({ "message": message }));
        assert!(!body.to_string().contains(DRIVER_DETAIL));
    }

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "message": "Database unreachable" }));
}

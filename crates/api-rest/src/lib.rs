//! # API REST
//!
//! REST API for the Patient Management System.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, CORS, status codes)
//!
//! The transport layer owns everything the core model does not: patient id
//! uniqueness, not-found handling, and mapping [`ValidationFailure`]s onto
//! HTTP 422 responses with a `detail` body.

#![warn(rust_2018_idioms)]

pub mod config;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use pms_core::{ValidationFailure, Violation, ViolationKind};
use pms_store::{sorted_by, PatientStore, Snapshot, SortField, SortOrder, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::AppConfig;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    store: PatientStore,
}

impl AppState {
    /// Creates application state around a snapshot store.
    pub fn new(store: PatientStore) -> Self {
        Self { store }
    }
}

/// Simple message response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageRes {
    pub message: String,
}

/// About response, mirroring the original service's shape.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AboutRes {
    pub key: String,
}

/// Error body: a `detail` field carrying either a message string or the list
/// of validation violations.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    #[schema(value_type = Object)]
    pub detail: Value,
}

/// Sort query parameters for `/sort`.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SortQuery {
    /// Field to sort on: height, weight or bmi.
    pub sort_by: String,
    /// Sort order: asc (default) or desc.
    #[serde(default = "default_order")]
    pub order_by: String,
}

fn default_order() -> String {
    "asc".into()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        about,
        view,
        view_patient,
        sort_patients,
        create_patient,
        update_patient,
        delete_patient
    ),
    components(schemas(MessageRes, AboutRes, ErrorDetail))
)]
struct ApiDoc;

/// Builds the REST router with all routes, Swagger UI and CORS applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/about", get(about))
        .route("/view", get(view))
        .route("/patient/:patient_id", get(view_patient))
        .route("/sort", get(sort_patients))
        .route("/create", post(create_patient))
        .route("/edit/:patient_id", put(update_patient))
        .route("/delete/:patient_id", delete(delete_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ErrorRes = (StatusCode, Json<ErrorDetail>);

fn not_found(message: &str) -> ErrorRes {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorDetail {
            detail: json!(message),
        }),
    )
}

fn bad_request(message: String) -> ErrorRes {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorDetail {
            detail: json!(message),
        }),
    )
}

fn unprocessable(failure: &ValidationFailure) -> ErrorRes {
    let detail = serde_json::to_value(&failure.violations)
        .unwrap_or_else(|_| json!(failure.to_string()));
    (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorDetail { detail }))
}

fn internal(err: &StoreError) -> ErrorRes {
    tracing::error!("store error: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorDetail {
            detail: json!("Internal error"),
        }),
    )
}

/// Pulls the patient id out of a create request body.
///
/// The core model never sees ids; they are extracted here and used as the
/// storage key.
fn take_id(fields: &mut pms_core::RawFields) -> Result<String, ErrorRes> {
    match fields.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id),
        Some(Value::String(_)) | None => {
            let failure = ValidationFailure {
                violations: vec![Violation {
                    field: "id".into(),
                    kind: ViolationKind::MissingField,
                    message: "id is required and cannot be empty".into(),
                }],
            };
            Err(unprocessable(&failure))
        }
        Some(_) => {
            let failure = ValidationFailure {
                violations: vec![Violation {
                    field: "id".into(),
                    kind: ViolationKind::WrongType,
                    message: "id must be a string".into(),
                }],
            };
            Err(unprocessable(&failure))
        }
    }
}

fn body_object(body: Value) -> Result<pms_core::RawFields, ErrorRes> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(bad_request("request body must be a JSON object".into())),
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = MessageRes))
)]
/// Service banner endpoint.
async fn root() -> Json<MessageRes> {
    Json(MessageRes {
        message: "Patient Management System API".into(),
    })
}

#[utoipa::path(
    get,
    path = "/about",
    responses((status = 200, description = "Service description", body = AboutRes))
)]
/// Short description of the service.
async fn about() -> Json<AboutRes> {
    Json(AboutRes {
        key: "A fully functional API to manage patient records".into(),
    })
}

#[utoipa::path(
    get,
    path = "/view",
    responses(
        (status = 200, description = "Full patient snapshot keyed by id", body = Object),
        (status = 500, description = "Internal server error", body = ErrorDetail)
    )
)]
/// Returns the full patient snapshot.
async fn view(State(state): State<AppState>) -> Result<Json<Snapshot>, ErrorRes> {
    let snapshot = state.store.load().map_err(|e| internal(&e))?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    get,
    path = "/patient/{patient_id}",
    params(("patient_id" = String, Path, description = "ID of patient in the DB")),
    responses(
        (status = 200, description = "The patient record", body = Object),
        (status = 404, description = "Patient not found", body = ErrorDetail),
        (status = 500, description = "Internal server error", body = ErrorDetail)
    )
)]
/// Returns a single patient record by id.
async fn view_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<pms_core::PatientRecord>, ErrorRes> {
    let snapshot = state.store.load().map_err(|e| internal(&e))?;
    match snapshot.get(&patient_id) {
        Some(record) => Ok(Json(record.clone())),
        None => Err(not_found("Patient not found")),
    }
}

#[utoipa::path(
    get,
    path = "/sort",
    params(SortQuery),
    responses(
        (status = 200, description = "Records sorted by the requested field", body = Object),
        (status = 400, description = "Invalid sort field or order", body = ErrorDetail),
        (status = 500, description = "Internal server error", body = ErrorDetail)
    )
)]
/// Returns all records sorted by height, weight or bmi.
async fn sort_patients(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Vec<pms_core::PatientRecord>>, ErrorRes> {
    let field: SortField = query.sort_by.parse().map_err(|e: StoreError| bad_request(e.to_string()))?;
    let order: SortOrder = query.order_by.parse().map_err(|e: StoreError| bad_request(e.to_string()))?;

    let snapshot = state.store.load().map_err(|e| internal(&e))?;
    Ok(Json(sorted_by(&snapshot, field, order)))
}

#[utoipa::path(
    post,
    path = "/create",
    request_body = Object,
    responses(
        (status = 201, description = "Patient created", body = MessageRes),
        (status = 400, description = "Patient already exists or malformed body", body = ErrorDetail),
        (status = 422, description = "Validation failed", body = ErrorDetail),
        (status = 500, description = "Internal server error", body = ErrorDetail)
    )
)]
/// Validates and stores a new patient record.
async fn create_patient(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<MessageRes>), ErrorRes> {
    let mut fields = body_object(body)?;
    let patient_id = take_id(&mut fields)?;

    let mut snapshot = state.store.load().map_err(|e| internal(&e))?;
    if snapshot.contains_key(&patient_id) {
        return Err(bad_request("Patient already exist".into()));
    }

    let record = pms_core::validate_new(&fields).map_err(|f| unprocessable(&f))?;

    snapshot.insert(patient_id.clone(), record);
    state.store.save(&snapshot).map_err(|e| internal(&e))?;
    tracing::info!(%patient_id, "patient created");

    Ok((
        StatusCode::CREATED,
        Json(MessageRes {
            message: "Patient created successfully".into(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/edit/{patient_id}",
    params(("patient_id" = String, Path, description = "ID of patient in the DB")),
    request_body = Object,
    responses(
        (status = 200, description = "Patient updated", body = MessageRes),
        (status = 404, description = "Patient does not exist", body = ErrorDetail),
        (status = 422, description = "Validation failed", body = ErrorDetail),
        (status = 500, description = "Internal server error", body = ErrorDetail)
    )
)]
/// Applies a partial update to an existing record.
///
/// The merged record is re-validated in full and its derived attributes are
/// recomputed before it replaces the stored one.
async fn update_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<MessageRes>, ErrorRes> {
    let mut fields = body_object(body)?;
    // The path owns the id; one in the body is ignored.
    fields.remove("id");

    let mut snapshot = state.store.load().map_err(|e| internal(&e))?;
    let existing = snapshot
        .get(&patient_id)
        .ok_or_else(|| not_found("Patient does not exist"))?;

    let updated = pms_core::validate_update(existing, &fields).map_err(|f| unprocessable(&f))?;

    snapshot.insert(patient_id.clone(), updated);
    state.store.save(&snapshot).map_err(|e| internal(&e))?;
    tracing::info!(%patient_id, "patient updated");

    Ok(Json(MessageRes {
        message: "Patient updated".into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/delete/{patient_id}",
    params(("patient_id" = String, Path, description = "ID of patient in the DB")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorDetail),
        (status = 500, description = "Internal server error", body = ErrorDetail)
    )
)]
/// Removes a patient record.
async fn delete_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<MessageRes>, ErrorRes> {
    let mut snapshot = state.store.load().map_err(|e| internal(&e))?;
    if snapshot.remove(&patient_id).is_none() {
        return Err(not_found("Patient not found"));
    }
    state.store.save(&snapshot).map_err(|e| internal(&e))?;
    tracing::info!(%patient_id, "patient deleted");

    Ok(Json(MessageRes {
        message: "Patient deleted".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        AppState::new(PatientStore::new(dir.path().join("patients.json")))
    }

    async fn send(
        state: &AppState,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json_body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json_body.to_string()))
                .expect("request"),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        };

        let response = app(state.clone()).oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    fn patient_body(id: &str, weight: f64) -> Value {
        json!({
            "id": id,
            "name": "Nishit",
            "city": "Gurgaon",
            "age": 30,
            "gender": "male",
            "height": 1.75,
            "weight": weight,
        })
    }

    #[tokio::test]
    async fn banner_endpoints_respond() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);

        let (status, body) = send(&state, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Patient Management System API");

        let (status, body) = send(&state, Method::GET, "/about", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["key"], "A fully functional API to manage patient records");
    }

    #[tokio::test]
    async fn create_view_edit_delete_flow() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);

        let (status, body) =
            send(&state, Method::POST, "/create", Some(patient_body("P001", 70.0))).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");

        // Duplicate id is a 400.
        let (status, body) =
            send(&state, Method::POST, "/create", Some(patient_body("P001", 70.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Patient already exist");

        // The stored record carries derived attributes and no id field.
        let (status, body) = send(&state, Method::GET, "/patient/P001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bmi"], 22.86);
        assert_eq!(body["verdict"], "Normal");
        assert_eq!(body["name"], "NISHIT");
        assert!(body.get("id").is_none());

        // Partial update recomputes the derived attributes.
        let (status, _) = send(
            &state,
            Method::PUT,
            "/edit/P001",
            Some(json!({"weight": 100.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&state, Method::GET, "/patient/P001", None).await;
        assert_eq!(body["bmi"], 32.65);
        assert_eq!(body["verdict"], "Obese");

        let (status, _) = send(&state, Method::DELETE, "/delete/P001", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&state, Method::GET, "/patient/P001", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_create_reports_every_violation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);

        let mut body = patient_body("P002", 70.0);
        body["age"] = json!(150);
        body["gender"] = json!("unknown");

        let (status, response) = send(&state, Method::POST, "/create", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let violations = response["detail"].as_array().expect("violation list");
        assert_eq!(violations.len(), 2);
    }

    #[tokio::test]
    async fn create_without_id_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);

        let mut body = patient_body("P003", 70.0);
        body.as_object_mut().expect("object").remove("id");

        let (status, response) = send(&state, Method::POST, "/create", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["detail"][0]["field"], "id");
    }

    #[tokio::test]
    async fn edit_unknown_patient_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);

        let (status, body) = send(
            &state,
            Method::PUT,
            "/edit/P404",
            Some(json!({"weight": 80.0})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Patient does not exist");
    }

    #[tokio::test]
    async fn sort_validates_parameters_and_orders_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(&dir);

        for (id, weight) in [("P001", 90.0), ("P002", 70.0), ("P003", 80.0)] {
            let (status, _) =
                send(&state, Method::POST, "/create", Some(patient_body(id, weight))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&state, Method::GET, "/sort?sort_by=weight", None).await;
        assert_eq!(status, StatusCode::OK);
        let weights: Vec<f64> = body
            .as_array()
            .expect("list")
            .iter()
            .map(|r| r["weight"].as_f64().expect("weight"))
            .collect();
        assert_eq!(weights, vec![70.0, 80.0, 90.0]);

        let (status, body) =
            send(&state, Method::GET, "/sort?sort_by=speed", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().expect("message").contains("invalid sort field"));
    }
}

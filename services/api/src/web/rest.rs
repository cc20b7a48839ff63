//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Read endpoints never report a store outage: they answer with stored or
//! demo entities, indistinguishably.

use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slate_core::domain::{ChatRequest, ChatResponse, Course, Lecture, LectureListing, Summary};
use slate_core::ports::PortError;
use slate_core::retrieval::DEFAULT_COURSE_LIMIT;
use slate_core::schema::EntityKind;
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        store_status_handler,
        list_courses_handler,
        list_lectures_handler,
        query_collection_handler,
        insert_document_handler,
        chat_handler,
    ),
    components(
        schemas(
            Course, Lecture, Summary, LectureListing, ChatRequest, ChatResponse,
            RootResponse, StatusResponse, QueryRequest, InsertResponse
        )
    ),
    tags(
        (name = "Slate LMS API", description = "Course, lecture and summary retrieval for the Slate LMS.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// Diagnostics about the backend and its document store.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub backend: String,
    pub database: String,
    pub database_url_set: bool,
    pub database_name_set: bool,
    pub connection_status: String,
    pub collections: Vec<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseQuery {
    /// Maximum number of courses, capped at 100.
    pub limit: Option<usize>,
}

/// A filtered read over one collection.
#[derive(Deserialize, ToSchema)]
pub struct QueryRequest {
    /// Flat object of `field: scalar` equality conditions.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub filter: Value,
    pub limit: Option<usize>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct InsertResponse {
    pub id: String,
}

fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::MalformedFilter(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        PortError::StoreUnavailable => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        PortError::Unexpected(_) => {
            error!("Request failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            )
        }
    }
}

fn entity_kind(collection: &str) -> Result<EntityKind, (StatusCode, String)> {
    EntityKind::from_collection(collection).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("Unknown collection '{}'", collection),
        )
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up", body = RootResponse))
)]
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Slate LMS backend ready".to_string(),
    })
}

/// Report backend and document store health.
#[utoipa::path(
    get,
    path = "/test",
    responses((status = 200, description = "Store diagnostics", body = StatusResponse))
)]
pub async fn store_status_handler(State(app_state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = app_state.retrieval.store_status().await;
    let (database, connection_status) = if status.available {
        ("connected", "Connected")
    } else {
        ("not available", "Not Connected")
    };
    Json(StatusResponse {
        backend: "running".to_string(),
        database: database.to_string(),
        database_url_set: app_state.config.database_url.is_some(),
        database_name_set: app_state.config.database_name.is_some(),
        connection_status: connection_status.to_string(),
        collections: status.collections,
    })
}

/// List courses, falling back to demo courses when none are stored.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseQuery),
    responses((status = 200, description = "Courses", body = Vec<Course>))
)]
pub async fn list_courses_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CourseQuery>,
) -> Json<Vec<Course>> {
    let limit = query.limit.unwrap_or(DEFAULT_COURSE_LIMIT);
    Json(app_state.retrieval.list_courses(limit).await)
}

/// List a course's lectures along with all stored summaries.
#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/lectures",
    params(("course_id" = String, Path, description = "The parent course id.")),
    responses((status = 200, description = "Lectures and summaries", body = LectureListing))
)]
pub async fn list_lectures_handler(
    State(app_state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Json<LectureListing> {
    Json(app_state.retrieval.list_lectures(&course_id).await)
}

/// Query one entity collection with an equality filter.
#[utoipa::path(
    post,
    path = "/api/collections/{collection}/query",
    params(("collection" = String, Path, description = "course, lecture or summary")),
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Matching entities (or demo entities)"),
        (status = 400, description = "Malformed filter"),
        (status = 404, description = "Unknown collection")
    )
)]
pub async fn query_collection_handler(
    State(app_state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    let kind = entity_kind(&collection)?;
    let limit = request.limit.unwrap_or(DEFAULT_COURSE_LIMIT);
    app_state
        .retrieval
        .query_collection(kind, request.filter, limit)
        .await
        .map(Json)
        .map_err(port_error_response)
}

/// Store one raw document. Used by ingestion flows.
#[utoipa::path(
    post,
    path = "/api/collections/{collection}",
    params(("collection" = String, Path, description = "Target collection name.")),
    request_body(content = Object, description = "The document to store."),
    responses(
        (status = 201, description = "Document stored", body = InsertResponse),
        (status = 400, description = "Body is not a JSON object"),
        (status = 503, description = "Document store unavailable")
    )
)]
pub async fn insert_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Json(document): Json<Value>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Value::Object(document) = document else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Document must be a JSON object".to_string(),
        ));
    };

    let id = app_state
        .retrieval
        .insert_document(&collection, document)
        .await
        .map_err(port_error_response)?;
    Ok((StatusCode::CREATED, Json(InsertResponse { id })))
}

/// Answer a chat message about the course material.
#[utoipa::path(
    post,
    path = "/api/ai/chat",
    request_body = ChatRequest,
    responses((status = 200, description = "Assistant reply", body = ChatResponse))
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    app_state
        .chat
        .reply(&request)
        .await
        .map(Json)
        .map_err(port_error_response)
}

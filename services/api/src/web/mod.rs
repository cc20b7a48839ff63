pub mod rest;
pub mod state;

pub use rest::{
    chat_handler, insert_document_handler, list_courses_handler, list_lectures_handler,
    query_collection_handler, root_handler, store_status_handler, ApiDoc,
};

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router, including the Swagger UI.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/", get(root_handler))
        .route("/test", get(store_status_handler))
        .route("/api/courses", get(list_courses_handler))
        .route("/api/courses/{course_id}/lectures", get(list_lectures_handler))
        .route("/api/collections/{collection}", post(insert_document_handler))
        .route(
            "/api/collections/{collection}/query",
            post(query_collection_handler),
        )
        .route("/api/ai/chat", post(chat_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented book routes into a single OpenAPI
//! document served at `/openapi.json`. The HTML account pages are not
//! part of the document.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the JSON API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Book catalog with batched, partial-field mutation and per-item result reporting.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::books::list_books,
        crate::routes::books::get_book,
        crate::routes::books::create_books,
        crate::routes::books::update_books,
        crate::routes::books::patch_book,
        crate::routes::books::delete_book,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::books::BookPayload,
        crate::routes::books::BatchRequest,
        crate::routes::books::OutcomeBody,
        crate::routes::books::BatchResponse,
        crate::routes::books::BookBody,
        crate::routes::books::BookListResponse,
        crate::routes::books::SuccessResponse,
        crate::routes::books::PatchBookRequest,
    )),
    tags(
        (name = "books", description = "Book catalog API"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

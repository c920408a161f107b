//! # Book Catalog API
//!
//! JSON endpoints for the book catalog. Batch create (`POST /books`) and
//! batch update (`PUT /books`) run through the
//! [`BatchProcessor`](bookshelf_core::BatchProcessor): every item is applied
//! independently and reported in input order. The response status is 200
//! when at least one item succeeded and 400 otherwise; the itemized list is
//! returned either way.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bookshelf_core::{Book, BookPatch, ChangeIntent, NewBook, Outcome, OutcomeKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

const CREATE_FAILED: &str = "Book NOT created, verify the request.";
const UPDATE_FAILED: &str = "Book NOT altered, verify the request.";

// -- DTOs ---------------------------------------------------------------------

/// One book in a request body. Absent fields are `None`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookPayload {
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl BookPayload {
    fn into_create(self) -> ChangeIntent {
        ChangeIntent::Create(NewBook::from_parts(
            self.isbn,
            self.title,
            self.author,
            self.price,
        ))
    }

    fn into_patch(self) -> ChangeIntent {
        ChangeIntent::PartialUpdate(BookPatch {
            isbn: self.isbn,
            title: self.title,
            author: self.author,
            price: self.price,
        })
    }
}

/// Batch request body: `{"Book": [...]}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchRequest {
    #[serde(rename = "Book")]
    pub books: Vec<BookPayload>,
}

/// Result of one batch item.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OutcomeBody {
    pub isbn: String,
    pub message: String,
}

impl From<Outcome> for OutcomeBody {
    fn from(outcome: Outcome) -> Self {
        Self {
            isbn: outcome.isbn,
            message: outcome.message,
        }
    }
}

/// Batch response: one entry per request item, in request order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchResponse {
    pub message: Vec<OutcomeBody>,
    /// Present only when no item succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<String>,
}

/// A stored book.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookBody {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub price: f64,
}

impl From<Book> for BookBody {
    fn from(book: Book) -> Self {
        Self {
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            price: book.price,
        }
    }
}

/// Catalog listing: `{"Books": [...]}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookListResponse {
    #[serde(rename = "Books")]
    pub books: Vec<BookBody>,
}

/// Single-record confirmation: `{"success": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: String,
}

/// Partial update of one book addressed by path.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchBookRequest {
    /// Optional; when present it must equal the path ISBN.
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

// -- Router -------------------------------------------------------------------

/// Build the books router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/books",
            get(list_books).post(create_books).put(update_books),
        )
        .route(
            "/books/:isbn",
            get(get_book).patch(patch_book).delete(delete_book),
        )
}

// -- Handlers -----------------------------------------------------------------

/// GET /books: List every book.
#[utoipa::path(
    get,
    path = "/books",
    responses(
        (status = 200, description = "All books ordered by ISBN", body = BookListResponse),
    ),
    tag = "books"
)]
async fn list_books(State(state): State<AppState>) -> Result<Json<BookListResponse>, AppError> {
    let books = state.books.list().await?;
    Ok(Json(BookListResponse {
        books: books.into_iter().map(BookBody::from).collect(),
    }))
}

/// GET /books/:isbn: Fetch one book.
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Book found", body = BookBody),
        (status = 404, description = "Book not found", body = crate::error::ErrorBody),
    ),
    tag = "books"
)]
async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> Result<Json<BookBody>, AppError> {
    state
        .books
        .get(&isbn)
        .await?
        .map(|book| Json(BookBody::from(book)))
        .ok_or_else(|| AppError::NotFound(format!("book {isbn}")))
}

/// POST /books: Create a batch of books.
#[utoipa::path(
    post,
    path = "/books",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "At least one book was created", body = BatchResponse),
        (status = 400, description = "No book was created", body = BatchResponse),
        (status = 422, description = "Batch exceeds the size limit", body = crate::error::ErrorBody),
    ),
    tag = "books"
)]
async fn create_books(
    State(state): State<AppState>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    let req = extract_json(body)?;
    let intents = batch_intents(&state, req, BookPayload::into_create)?;
    Ok(run_batch(&state, intents, CREATE_FAILED).await)
}

/// PUT /books: Partially update a batch of books.
#[utoipa::path(
    put,
    path = "/books",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "At least one book was altered", body = BatchResponse),
        (status = 400, description = "No book was altered", body = BatchResponse),
        (status = 422, description = "Batch exceeds the size limit", body = crate::error::ErrorBody),
    ),
    tag = "books"
)]
async fn update_books(
    State(state): State<AppState>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    let req = extract_json(body)?;
    let intents = batch_intents(&state, req, BookPayload::into_patch)?;
    Ok(run_batch(&state, intents, UPDATE_FAILED).await)
}

/// PATCH /books/:isbn: Partially update one book.
#[utoipa::path(
    patch,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Book ISBN")),
    request_body = PatchBookRequest,
    responses(
        (status = 200, description = "Book altered", body = SuccessResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorBody),
        (status = 422, description = "Body isbn differs from the path", body = crate::error::ErrorBody),
    ),
    tag = "books"
)]
async fn patch_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    body: Result<Json<PatchBookRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let req = extract_json(body)?;
    if let Some(body_isbn) = req.isbn.as_deref() {
        if body_isbn != isbn {
            return Err(AppError::Validation(format!(
                "isbn {body_isbn} in body does not match {isbn} in path; the isbn cannot be changed"
            )));
        }
    }

    let intent = ChangeIntent::PartialUpdate(BookPatch {
        isbn,
        title: req.title,
        author: req.author,
        price: req.price,
    });
    let mut report = state
        .processor
        .process(vec![intent], state.books.as_ref())
        .await;
    let outcome = report
        .outcomes
        .pop()
        .ok_or_else(|| AppError::Internal("batch of one produced no outcome".to_string()))?;

    match outcome.kind {
        OutcomeKind::Created | OutcomeKind::Altered => Ok(Json(SuccessResponse {
            success: outcome.message,
        })),
        OutcomeKind::NotApplied => Err(AppError::NotFound(outcome.message)),
        OutcomeKind::Rejected => Err(AppError::Validation(outcome.message)),
        OutcomeKind::Failed => Err(AppError::Internal(outcome.message)),
    }
}

/// DELETE /books/:isbn: Delete one book.
///
/// Deleting a book that does not exist is not an error; the message says so.
#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Deletion result", body = SuccessResponse),
    ),
    tag = "books"
)]
async fn delete_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let rows = state.books.delete(&isbn).await?;
    tracing::info!(isbn = %isbn, rows, "book delete");
    let success = if rows > 0 {
        format!("Book {isbn} deleted successfully ({rows} row affected)")
    } else {
        format!("Book {isbn} NOT exists ({rows} row affected)")
    };
    Ok(Json(SuccessResponse { success }))
}

// -- Batch plumbing -----------------------------------------------------------

/// Turn a batch body into intents, enforcing the configured size limit
/// before anything reaches the store. An empty batch passes through and
/// is reported like any batch with no successes.
fn batch_intents(
    state: &AppState,
    req: BatchRequest,
    to_intent: fn(BookPayload) -> ChangeIntent,
) -> Result<Vec<ChangeIntent>, AppError> {
    let max = state.config.max_batch_size;
    let n = req.books.len();
    if n > max {
        return Err(AppError::Validation(format!(
            "batch of {n} books exceeds the limit of {max}"
        )));
    }
    Ok(req.books.into_iter().map(to_intent).collect())
}

async fn run_batch(
    state: &AppState,
    intents: Vec<ChangeIntent>,
    failed_message: &str,
) -> (StatusCode, Json<BatchResponse>) {
    let report = state
        .processor
        .process(intents, state.books.as_ref())
        .await;
    let (status, failed) = if report.any_succeeded {
        (StatusCode::OK, None)
    } else {
        (StatusCode::BAD_REQUEST, Some(failed_message.to_string()))
    };
    let body = BatchResponse {
        message: report.outcomes.into_iter().map(OutcomeBody::from).collect(),
        failed,
    };
    (status, Json(body))
}

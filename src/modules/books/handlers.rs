//! One handler per books operation: validate, call the repository once, shape
//! the response.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_http::error::AppError;
use serde::Serialize;

use super::error::BookError;
use super::models::{parse_flag_value, Book, BookFields, BookFlag, BookSummary};
use super::repository::SharedRepository;
use super::validation::{validate_create, validate_update};

#[derive(Debug, Serialize)]
struct Success<T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn success<T: Serialize>(
    status: StatusCode,
    message: Option<&'static str>,
    data: Option<T>,
) -> Response {
    (
        status,
        Json(Success {
            status: "success",
            message,
            data,
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct BooksData<T> {
    books: Vec<T>,
}

#[derive(Debug, Serialize)]
struct BookData<T> {
    book: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedData {
    book_id: String,
}

/// Which operation failed, so each failure gets its own status and wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    FilterByFlag,
    FilterByName,
}

impl BookError {
    fn respond(self, operation: Operation) -> AppError {
        use Operation::*;

        match self {
            // Create answers a missing name with 404, update with 400.
            BookError::MissingField if operation == Create => {
                AppError::not_found("Failed to add book. Please provide the book name")
            }
            BookError::MissingField => {
                AppError::bad_request("Failed to update book. Please provide the book name")
            }
            BookError::PageRangeInvalid if operation == Create => AppError::bad_request(
                "Failed to add book. readPage must not be greater than pageCount",
            ),
            BookError::PageRangeInvalid => AppError::bad_request(
                "Failed to update book. readPage must not be greater than pageCount",
            ),
            BookError::NotFound => AppError::not_found(match operation {
                Update => "Failed to update book. Id not found",
                Delete => "Failed to delete book. Id not found",
                FilterByName => "Book data not found",
                List | Get | Create | FilterByFlag => "Book not found",
            }),
            BookError::EmptyFilter if operation == FilterByName => {
                AppError::bad_request("Book not found, query is empty")
            }
            BookError::EmptyFilter => AppError::bad_request("Book not found, invalid query"),
            BookError::BodyTooLarge if operation == Create => {
                AppError::payload_too_large("Failed to add book. Request body is too large")
            }
            BookError::BodyTooLarge => {
                AppError::payload_too_large("Failed to update book. Request body is too large")
            }
            BookError::MalformedBody(e) => AppError::internal(e),
            BookError::BodyRead(e) => AppError::internal(e),
            BookError::Store(e) => AppError::internal(e),
        }
    }
}

/// Parse a body the `Bytes` extractor has already buffered in full.
fn read_fields(body: Result<Bytes, BytesRejection>) -> Result<BookFields, BookError> {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(BookError::BodyTooLarge)
        }
        Err(rejection) => return Err(rejection.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn list_books(repository: SharedRepository) -> Result<Response, AppError> {
    let books = repository
        .list_all()
        .await
        .map_err(|e| BookError::from(e).respond(Operation::List))?;

    Ok(success(StatusCode::OK, None, Some(BooksData { books })))
}

pub async fn get_book_by_id(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let book = repository
        .get_by_id(&id)
        .await
        .map_err(BookError::from)
        .and_then(|found| found.ok_or(BookError::NotFound))
        .map_err(|e| e.respond(Operation::Get))?;

    Ok(success(StatusCode::OK, None, Some(BookData { book })))
}

pub async fn create_book(
    State(repository): State<SharedRepository>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let book = create(&repository, body)
        .await
        .map_err(|e| e.respond(Operation::Create))?;

    tracing::info!(book_id = %book.id, "book created");

    Ok(success(
        StatusCode::CREATED,
        Some("Book added successfully"),
        Some(CreatedData { book_id: book.id }),
    ))
}

async fn create(
    repository: &SharedRepository,
    body: Result<Bytes, BytesRejection>,
) -> Result<Book, BookError> {
    let fields = read_fields(body)?;
    let draft = validate_create(fields)?;
    Ok(repository.create(draft).await?)
}

pub async fn update_book_by_id(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let book = update(&repository, &id, body)
        .await
        .map_err(|e| e.respond(Operation::Update))?;

    tracing::info!(book_id = %book.id, "book updated");

    Ok(success(StatusCode::OK, None, Some(BookData { book })))
}

/// Existence is checked before the fields are validated.
async fn update(
    repository: &SharedRepository,
    id: &str,
    body: Result<Bytes, BytesRejection>,
) -> Result<Book, BookError> {
    let fields = read_fields(body)?;
    let current = repository
        .get_by_id(id)
        .await?
        .ok_or(BookError::NotFound)?;
    let draft = validate_update(fields)?;
    repository
        .update(id, draft, current.updated_at)
        .await?
        .ok_or(BookError::NotFound)
}

pub async fn delete_book_by_id(
    State(repository): State<SharedRepository>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let deleted = repository
        .delete(&id)
        .await
        .map_err(|e| BookError::from(e).respond(Operation::Delete))?;
    if !deleted {
        return Err(BookError::NotFound.respond(Operation::Delete));
    }

    tracing::info!(book_id = %id, "book deleted");

    Ok(success::<()>(
        StatusCode::OK,
        Some("Book deleted successfully"),
        None,
    ))
}

pub async fn filter_books_by_flag(
    repository: SharedRepository,
    flag: BookFlag,
    raw_value: String,
) -> Result<Response, AppError> {
    let books = filter_by_flag(&repository, flag, &raw_value)
        .await
        .map_err(|e| e.respond(Operation::FilterByFlag))?;

    Ok(success(StatusCode::OK, None, Some(BooksData { books })))
}

async fn filter_by_flag(
    repository: &SharedRepository,
    flag: BookFlag,
    raw_value: &str,
) -> Result<Vec<Book>, BookError> {
    if raw_value.is_empty() {
        return Err(BookError::EmptyFilter);
    }
    // A value that is not a number matches no row.
    match parse_flag_value(raw_value) {
        Some(value) => Ok(repository.filter_by_flag(flag, value).await?),
        None => Ok(Vec::new()),
    }
}

/// Returns a single book even when several names match.
pub async fn find_book_by_name(
    repository: SharedRepository,
    fragment: String,
) -> Result<Response, AppError> {
    let book = find_by_name(&repository, &fragment)
        .await
        .map_err(|e| e.respond(Operation::FilterByName))?;

    Ok(success(StatusCode::OK, None, Some(BookData { book })))
}

async fn find_by_name(
    repository: &SharedRepository,
    fragment: &str,
) -> Result<BookSummary, BookError> {
    if fragment.is_empty() {
        return Err(BookError::EmptyFilter);
    }
    repository
        .find_by_name_substring(fragment)
        .await?
        .ok_or(BookError::NotFound)
}

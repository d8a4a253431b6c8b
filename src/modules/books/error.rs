use axum::extract::rejection::BytesRejection;
use thiserror::Error;

use super::repository::StoreError;

/// Everything that can stop a books request.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("name is required")]
    MissingField,

    #[error("readPage must not be greater than pageCount")]
    PageRangeInvalid,

    #[error("book not found")]
    NotFound,

    /// A filter query parameter was present but empty.
    #[error("filter value is empty")]
    EmptyFilter,

    #[error(transparent)]
    MalformedBody(#[from] serde_json::Error),

    #[error("request body exceeds the size limit")]
    BodyTooLarge,

    /// The body stream failed before it was fully read.
    #[error(transparent)]
    BodyRead(#[from] BytesRejection),

    #[error(transparent)]
    Store(#[from] StoreError),
}

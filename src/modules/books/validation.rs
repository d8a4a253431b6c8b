//! Field checks run before any write.

use super::error::BookError;
use super::models::{BookDraft, BookFields};

pub fn validate_create(fields: BookFields) -> Result<BookDraft, BookError> {
    validate(fields)
}

/// Same checks as [`validate_create`]. The caller has already confirmed the
/// target record exists.
pub fn validate_update(fields: BookFields) -> Result<BookDraft, BookError> {
    validate(fields)
}

/// `true` only when both page fields are present and equal.
pub fn is_finished(page_count: Option<u32>, read_page: Option<u32>) -> bool {
    matches!((page_count, read_page), (Some(count), Some(read)) if count == read)
}

fn validate(fields: BookFields) -> Result<BookDraft, BookError> {
    let name = match fields.name {
        Some(name) if !name.is_empty() => name,
        _ => return Err(BookError::MissingField),
    };

    // An absent page count is unbounded.
    if let (Some(read_page), Some(page_count)) = (fields.read_page, fields.page_count) {
        if read_page > page_count {
            return Err(BookError::PageRangeInvalid);
        }
    }

    Ok(BookDraft {
        name,
        year: fields.year,
        author: fields.author,
        summary: fields.summary,
        publisher: fields.publisher,
        page_count: fields.page_count,
        read_page: fields.read_page,
        reading: fields.reading,
    })
}

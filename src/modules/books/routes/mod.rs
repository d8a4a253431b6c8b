//! Route table for `/books`.
//!
//! `GET /books` shares one path between the plain listing and the three
//! filters, so the query string picks the handler.

use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    response::Response,
    routing::get,
    Router,
};
use bookshelf_http::error::AppError;

use super::handlers;
use super::models::BookFlag;
use super::repository::SharedRepository;

/// What a `GET /books` request asks for, decided from its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookQuery {
    All,
    Flag(BookFlag, String),
    Name(String),
    /// Parameters are present but none of them is a known filter.
    Unrecognized,
}

impl BookQuery {
    /// First match wins: `reading`, then `finished`, then `name`.
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        if params.is_empty() {
            return BookQuery::All;
        }
        if let Some(value) = params.remove("reading") {
            return BookQuery::Flag(BookFlag::Reading, value);
        }
        if let Some(value) = params.remove("finished") {
            return BookQuery::Flag(BookFlag::Finished, value);
        }
        if let Some(value) = params.remove("name") {
            return BookQuery::Name(value);
        }
        BookQuery::Unrecognized
    }
}

/// Largest request body the mutating routes will buffer.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn router(repository: SharedRepository) -> Router {
    Router::new()
        .route("/books", get(get_books).post(handlers::create_book))
        .route(
            "/books/{id}",
            get(handlers::get_book_by_id)
                .put(handlers::update_book_by_id)
                .delete(handlers::delete_book_by_id),
        )
        .with_state(repository)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

async fn get_books(
    State(repository): State<SharedRepository>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    match BookQuery::from_params(params) {
        BookQuery::All => handlers::list_books(repository).await,
        BookQuery::Flag(flag, value) => handlers::filter_books_by_flag(repository, flag, value).await,
        BookQuery::Name(fragment) => handlers::find_book_by_name(repository, fragment).await,
        BookQuery::Unrecognized => Err(AppError::RouteNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn no_params_lists_everything() {
        assert_eq!(BookQuery::from_params(params(&[])), BookQuery::All);
    }

    #[test]
    fn each_filter_is_recognized() {
        assert_eq!(
            BookQuery::from_params(params(&[("reading", "1")])),
            BookQuery::Flag(BookFlag::Reading, "1".to_string())
        );
        assert_eq!(
            BookQuery::from_params(params(&[("finished", "0")])),
            BookQuery::Flag(BookFlag::Finished, "0".to_string())
        );
        assert_eq!(
            BookQuery::from_params(params(&[("name", "art")])),
            BookQuery::Name("art".to_string())
        );
    }

    #[test]
    fn reading_beats_finished_beats_name() {
        assert_eq!(
            BookQuery::from_params(params(&[("name", "a"), ("finished", "1"), ("reading", "0")])),
            BookQuery::Flag(BookFlag::Reading, "0".to_string())
        );
        assert_eq!(
            BookQuery::from_params(params(&[("name", "a"), ("finished", "1")])),
            BookQuery::Flag(BookFlag::Finished, "1".to_string())
        );
    }

    #[test]
    fn empty_values_are_kept_for_the_handler_to_reject() {
        assert_eq!(
            BookQuery::from_params(params(&[("reading", "")])),
            BookQuery::Flag(BookFlag::Reading, String::new())
        );
    }

    #[test]
    fn unknown_params_are_unrecognized() {
        assert_eq!(
            BookQuery::from_params(params(&[("author", "x")])),
            BookQuery::Unrecognized
        );
    }
}

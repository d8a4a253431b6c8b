use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::models::{next_timestamp, timestamp_now, Book, BookDraft, BookFlag, BookSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type SharedRepository = Arc<dyn BookRepository>;

/// Persistence boundary for books. Every method is a single statement.
#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// All books, projected to id/name/publisher.
    async fn list_all(&self) -> Result<Vec<BookSummary>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Persist a new book under a fresh id with both timestamps set to now.
    async fn create(&self, draft: BookDraft) -> Result<Book, StoreError>;

    /// Replace every field except `id` and `insertedAt`. The new `updatedAt` is
    /// strictly later than `previous_updated_at`. `None` when no row has `id`.
    async fn update(
        &self,
        id: &str,
        draft: BookDraft,
        previous_updated_at: OffsetDateTime,
    ) -> Result<Option<Book>, StoreError>;

    /// `false` when no row has `id`.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Books whose flag column equals `value` as an integer; NULL never matches.
    async fn filter_by_flag(&self, flag: BookFlag, value: i64) -> Result<Vec<Book>, StoreError>;

    /// First book whose name contains `fragment`, projected like [`list_all`].
    ///
    /// [`list_all`]: BookRepository::list_all
    async fn find_by_name_substring(
        &self,
        fragment: &str,
    ) -> Result<Option<BookSummary>, StoreError>;
}

const BOOK_COLUMNS: &str = "id, name, year, author, summary, publisher, page_count, read_page, \
                            finished, reading, inserted_at, updated_at";

pub struct SqlBookRepository {
    pool: SqlitePool,
}

impl SqlBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: String,
    name: String,
    year: Option<i32>,
    author: Option<String>,
    summary: Option<String>,
    publisher: Option<String>,
    page_count: Option<u32>,
    read_page: Option<u32>,
    finished: bool,
    reading: Option<bool>,
    inserted_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book {
            id: value.id,
            name: value.name,
            year: value.year,
            author: value.author,
            summary: value.summary,
            publisher: value.publisher,
            page_count: value.page_count,
            read_page: value.read_page,
            finished: value.finished,
            reading: value.reading,
            inserted_at: value.inserted_at,
            updated_at: value.updated_at,
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for SqlBookRepository {
    async fn list_all(&self) -> Result<Vec<BookSummary>, StoreError> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT id, name, publisher
            FROM books
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Book::from))
    }

    async fn create(&self, draft: BookDraft) -> Result<Book, StoreError> {
        let book = Book::new(Uuid::now_v7().to_string(), draft, timestamp_now());

        sqlx::query(
            r#"
            INSERT INTO books (id, name, year, author, summary, publisher, page_count,
                               read_page, finished, reading, inserted_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.id)
        .bind(&book.name)
        .bind(book.year)
        .bind(&book.author)
        .bind(&book.summary)
        .bind(&book.publisher)
        .bind(book.page_count)
        .bind(book.read_page)
        .bind(book.finished)
        .bind(book.reading)
        .bind(book.inserted_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(book_id = %book.id, "book inserted");
        Ok(book)
    }

    async fn update(
        &self,
        id: &str,
        draft: BookDraft,
        previous_updated_at: OffsetDateTime,
    ) -> Result<Option<Book>, StoreError> {
        let finished = draft.finished();
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
            SET name = ?, year = ?, author = ?, summary = ?, publisher = ?, page_count = ?,
                read_page = ?, finished = ?, reading = ?, updated_at = ?
            WHERE id = ?
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(draft.name)
        .bind(draft.year)
        .bind(draft.author)
        .bind(draft.summary)
        .bind(draft.publisher)
        .bind(draft.page_count)
        .bind(draft.read_page)
        .bind(finished)
        .bind(draft.reading)
        .bind(next_timestamp(previous_updated_at))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Book::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn filter_by_flag(&self, flag: BookFlag, value: i64) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE {} = ?",
            flag.column()
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_name_substring(
        &self,
        fragment: &str,
    ) -> Result<Option<BookSummary>, StoreError> {
        let book = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT id, name, publisher
            FROM books
            WHERE name LIKE ?
            LIMIT 1
            "#,
        )
        .bind(format!("%{fragment}%"))
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::schema;
    use bookshelf_kernel::settings::DatabaseSettings;

    async fn repository() -> SqlBookRepository {
        let pool = bookshelf_db::connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();
        let statements = schema()
            .into_iter()
            .map(|statement| ("books".to_string(), statement))
            .collect::<Vec<_>>();
        bookshelf_db::sync_schema(&pool, &statements).await.unwrap();
        SqlBookRepository::new(pool)
    }

    fn draft(name: &str) -> BookDraft {
        BookDraft {
            name: name.to_string(),
            year: Some(1997),
            author: Some("J. K. Rowling".to_string()),
            summary: Some("A boy wizard".to_string()),
            publisher: Some("Bloomsbury".to_string()),
            page_count: Some(223),
            read_page: Some(223),
            reading: Some(false),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = repository().await;
        let created = repo.create(draft("Harry Potter")).await.unwrap();

        assert!(created.finished);
        assert_eq!(created.inserted_at, created.updated_at);

        let found = repo.get_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let repo = repository().await;
        let a = repo.create(draft("A")).await.unwrap();
        let b = repo.create(draft("A")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn list_all_projects_summary_fields() {
        let repo = repository().await;
        let created = repo.create(draft("Harry Potter")).await.unwrap();

        let books = repo.list_all().await.unwrap();
        assert_eq!(
            books,
            vec![BookSummary {
                id: created.id,
                name: "Harry Potter".to_string(),
                publisher: Some("Bloomsbury".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn update_keeps_identity_and_advances_updated_at() {
        let repo = repository().await;
        let created = repo.create(draft("Harry Potter")).await.unwrap();

        let replacement = BookDraft {
            name: "Dune".to_string(),
            year: None,
            author: None,
            summary: None,
            publisher: None,
            page_count: Some(412),
            read_page: Some(12),
            reading: Some(true),
        };
        let updated = repo
            .update(&created.id, replacement, created.updated_at)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.inserted_at, created.inserted_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.name, "Dune");
        assert_eq!(updated.publisher, None);
        assert_eq!(updated.read_page, Some(12));
        assert!(!updated.finished);
        assert_eq!(updated.reading, Some(true));

        assert_eq!(repo.get_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn back_to_back_updates_always_advance_updated_at() {
        let repo = repository().await;
        let created = repo.create(draft("Harry Potter")).await.unwrap();

        let mut previous = created.updated_at;
        for _ in 0..50 {
            let updated = repo
                .update(&created.id, draft("Harry Potter"), previous)
                .await
                .unwrap()
                .unwrap();
            assert!(updated.updated_at > previous);
            assert_eq!(updated.inserted_at, created.inserted_at);
            previous = updated.updated_at;
        }
    }

    #[tokio::test]
    async fn missing_ids_are_reported() {
        let repo = repository().await;
        assert_eq!(repo.get_by_id("missing").await.unwrap(), None);
        assert_eq!(repo.update("missing", draft("A"), timestamp_now()).await.unwrap(), None);
        assert!(!repo.delete("missing").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let repo = repository().await;
        let created = repo.create(draft("A")).await.unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert_eq!(repo.get_by_id(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn flag_filter_uses_integer_equality() {
        let repo = repository().await;
        let reading = repo
            .create(BookDraft {
                reading: Some(true),
                ..draft("Reading")
            })
            .await
            .unwrap();
        let not_reading = repo
            .create(BookDraft {
                reading: Some(false),
                ..draft("Not reading")
            })
            .await
            .unwrap();
        repo.create(BookDraft {
            reading: None,
            ..draft("Unknown")
        })
        .await
        .unwrap();

        let ids = |books: Vec<Book>| books.into_iter().map(|b| b.id).collect::<Vec<_>>();

        assert_eq!(
            ids(repo.filter_by_flag(BookFlag::Reading, 1).await.unwrap()),
            vec![reading.id]
        );
        assert_eq!(
            ids(repo.filter_by_flag(BookFlag::Reading, 0).await.unwrap()),
            vec![not_reading.id]
        );
        assert!(repo
            .filter_by_flag(BookFlag::Reading, 2)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn finished_filter_matches_derived_flag() {
        let repo = repository().await;
        let done = repo.create(draft("Done")).await.unwrap();
        let open = repo
            .create(BookDraft {
                read_page: Some(1),
                ..draft("Open")
            })
            .await
            .unwrap();

        let finished = repo.filter_by_flag(BookFlag::Finished, 1).await.unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].id, done.id);

        let unfinished = repo.filter_by_flag(BookFlag::Finished, 0).await.unwrap();
        assert_eq!(unfinished.len(), 1);
        assert_eq!(unfinished[0].id, open.id);
    }

    #[tokio::test]
    async fn name_search_returns_first_match_only() {
        let repo = repository().await;
        let first = repo.create(draft("Harry Potter")).await.unwrap();
        repo.create(draft("The Art of War")).await.unwrap();

        let found = repo.find_by_name_substring("ar").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.name, "Harry Potter");

        assert_eq!(repo.find_by_name_substring("zzz").await.unwrap(), None);
    }
}

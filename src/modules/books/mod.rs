pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod validation;


use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module, SchemaStatement};
use serde_json::json;

use repository::SharedRepository;

/// The book catalog: CRUD plus reading/finished/name filters over one table.
pub struct BooksModule {
    repository: SharedRepository,
}

impl BooksModule {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

/// Table backing the module.
pub fn schema() -> Vec<SchemaStatement> {
    vec![SchemaStatement {
        id: "001_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                year        INTEGER,
                author      TEXT,
                summary     TEXT,
                publisher   TEXT,
                page_count  INTEGER,
                read_page   INTEGER,
                finished    BOOLEAN NOT NULL,
                reading     BOOLEAN,
                inserted_at TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
    }]
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn schema(&self) -> Vec<SchemaStatement> {
        schema()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn fail_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/FailResponse" }
            }
        }
    })
}

fn internal_response() -> serde_json::Value {
    json!({
        "description": "Unhandled error",
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/InternalErrorResponse" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let fields_body = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookFields" }
            }
        }
    });

    json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List books, or filter by exactly one of reading, finished, name",
                    "tags": ["Books"],
                    "parameters": [
                        { "name": "reading", "in": "query", "schema": { "type": "string" } },
                        { "name": "finished", "in": "query", "schema": { "type": "string" } },
                        { "name": "name", "in": "query", "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": { "description": "Books, or a single book for the name filter" },
                        "400": fail_response("Empty filter value"),
                        "404": fail_response("No book matches the name filter"),
                        "500": internal_response()
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": fields_body.clone(),
                    "responses": {
                        "201": { "description": "Book added; data.bookId holds the new id" },
                        "400": fail_response("readPage greater than pageCount"),
                        "404": fail_response("Missing name"),
                        "413": fail_response("Request body is too large"),
                        "500": internal_response()
                    }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": {
                            "description": "The book",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "404": fail_response("Unknown id"),
                        "500": internal_response()
                    }
                },
                "put": {
                    "summary": "Replace a book's fields",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "requestBody": fields_body,
                    "responses": {
                        "200": { "description": "The updated book" },
                        "400": fail_response("Missing name or readPage greater than pageCount"),
                        "404": fail_response("Unknown id"),
                        "413": fail_response("Request body is too large"),
                        "500": internal_response()
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": { "description": "Book deleted" },
                        "404": fail_response("Unknown id"),
                        "500": internal_response()
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "year": { "type": "integer", "nullable": true },
                        "author": { "type": "string", "nullable": true },
                        "summary": { "type": "string", "nullable": true },
                        "publisher": { "type": "string", "nullable": true },
                        "pageCount": { "type": "integer", "minimum": 0, "nullable": true },
                        "readPage": { "type": "integer", "minimum": 0, "nullable": true },
                        "finished": { "type": "boolean" },
                        "reading": { "type": "boolean", "nullable": true },
                        "insertedAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "name", "finished", "insertedAt", "updatedAt"]
                },
                "BookFields": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "year": { "type": "integer" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0 },
                        "reading": { "type": "boolean" }
                    },
                    "required": ["name"]
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(repository: SharedRepository) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(repository))
}

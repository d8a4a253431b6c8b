pub mod books;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;
use sqlx::SqlitePool;

use books::repository::SqlBookRepository;

/// Register all project modules, binding their repositories to `pool`
pub fn register_all(registry: &mut ModuleRegistry, pool: &SqlitePool) {
    registry.register(books::create_module(Arc::new(SqlBookRepository::new(
        pool.clone(),
    ))));
}

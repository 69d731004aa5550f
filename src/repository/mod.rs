//! Repository layer: store contracts and their Postgres / in-memory backends

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor},
        book::{Book, CreateBook},
        book_instance::{BookInstance, LoanStatus, LoanedCopy},
        genre::Genre,
        pagination::PageWindow,
    },
};

pub use memory::MemoryStore;

/// Storage for physical copies.
///
/// `save` is an optimistic write: it only applies when the stored version
/// still equals `instance.version`, fails with `Conflict` otherwise, and
/// returns the record carrying its bumped version.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<BookInstance>;
    async fn create(&self, instance: &BookInstance) -> AppResult<BookInstance>;
    async fn save(&self, instance: &BookInstance) -> AppResult<BookInstance>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>>;
    /// Count copies, optionally restricted to one status
    async fn count(&self, status: Option<LoanStatus>) -> AppResult<i64>;
    async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64>;
    /// Copies on loan ordered by due date, optionally for a single borrower
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        window: PageWindow,
    ) -> AppResult<(Vec<LoanedCopy>, i64)>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self, window: PageWindow) -> AppResult<(Vec<Book>, i64)>;
    async fn get(&self, id: i32) -> AppResult<Book>;
    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
    async fn create(&self, data: &CreateBook) -> AppResult<Book>;
    async fn update(&self, book: &Book) -> AppResult<Book>;
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn count(&self) -> AppResult<i64>;
    /// Case-insensitive substring match on titles
    async fn count_title_contains(&self, fragment: &str) -> AppResult<i64>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn list(&self, window: PageWindow) -> AppResult<(Vec<Author>, i64)>;
    async fn get(&self, id: i32) -> AppResult<Author>;
    async fn create(&self, data: &CreateAuthor) -> AppResult<Author>;
    async fn update(&self, author: &Author) -> AppResult<Author>;
    /// Books by the author are kept, with no author
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Genre>>;
    async fn count(&self) -> AppResult<i64>;
}

/// Handles to every store, shared by the services
#[derive(Clone)]
pub struct Repository {
    pub book_instances: Arc<dyn BookInstanceStore>,
    pub books: Arc<dyn BookStore>,
    pub authors: Arc<dyn AuthorStore>,
    pub genres: Arc<dyn GenreStore>,
}

impl Repository {
    /// Create a Postgres-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            book_instances: Arc::new(book_instances::BookInstancesRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            genres: Arc::new(genres::GenresRepository::new(pool)),
        }
    }

    /// Create a repository where every store is the given in-memory store
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            book_instances: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            authors: Arc::new(store.clone()),
            genres: Arc::new(store),
        }
    }
}

/// Map a unique-constraint violation to `Duplicate`, anything else to `Database`
pub(crate) fn duplicate_on_unique(message: String) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
            AppError::Duplicate(message)
        } else {
            AppError::Database(e)
        }
    }
}

/// Escape LIKE metacharacters so `fragment` matches literally
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

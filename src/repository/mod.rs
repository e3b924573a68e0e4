//! Repository layer for book persistence

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookChanges, BookId, NewBook, Pagination},
};

pub use memory::InMemoryBooksRepository;
pub use mongo::MongoBooksRepository;

pub(crate) fn book_not_found() -> AppError {
    AppError::NotFound("Livro não encontrado".to_string())
}

/// Storage operations for the books collection.
///
/// Identifiers are taken as `BookId`, so malformed ids are rejected before any store call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// Insert a new book, stamping both timestamps
    async fn insert(&self, book: NewBook) -> AppResult<Book>;

    /// Fetch one page of books, newest first
    async fn find_page(&self, pagination: Pagination) -> AppResult<Vec<Book>>;

    /// Number of books in the collection
    async fn count(&self) -> AppResult<u64>;

    async fn get_by_id(&self, id: &BookId) -> AppResult<Book>;

    /// Set the supplied fields and refresh `updatedAt`; returns the updated record
    async fn update(&self, id: &BookId, changes: BookChanges) -> AppResult<Book>;

    /// Remove a book and return its last stored state
    async fn delete(&self, id: &BookId) -> AppResult<Book>;

    /// Round-trip to the store
    async fn ping(&self) -> AppResult<()>;
}

//! Book catalog service

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        book::PageQuery, Book, BookId, BookPage, CreateBook, Pagination, UpdateBook,
    },
    repository::BooksRepository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Arc<dyn BooksRepository>,
}

impl BooksService {
    pub fn new(repository: Arc<dyn BooksRepository>) -> Self {
        Self { repository }
    }

    /// Validate and insert a new book
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let book = data.into_new_book()?;
        let created = self.repository.insert(book).await?;
        tracing::info!("Created book {}", created.id);
        Ok(created)
    }

    /// One page of books, newest first, with the size of the whole collection
    pub async fn list(&self, query: &PageQuery) -> AppResult<BookPage> {
        let pagination = Pagination::from(query);

        let (items, total) = tokio::try_join!(
            self.repository.find_page(pagination),
            self.repository.count(),
        )?;

        Ok(BookPage {
            page: pagination.page,
            limit: pagination.limit,
            total,
            items,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        let id: BookId = id.parse()?;
        self.repository.get_by_id(&id).await
    }

    /// Apply a partial update; only supplied fields change
    pub async fn update(&self, id: &str, data: UpdateBook) -> AppResult<Book> {
        let id: BookId = id.parse()?;
        let changes = data.into_changes()?;
        let updated = self.repository.update(&id, changes).await?;
        tracing::info!("Updated book {}", id);
        Ok(updated)
    }

    /// Delete a book, returning its last known state
    pub async fn delete(&self, id: &str) -> AppResult<Book> {
        let id: BookId = id.parse()?;
        let deleted = self.repository.delete(&id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(deleted)
    }

    /// Check that the store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

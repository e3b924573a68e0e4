//! Process-local books repository, used by tests and for running without a database

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::RwLock;

use super::{book_not_found, BooksRepository};
use crate::{
    error::AppResult,
    models::{Book, BookChanges, BookId, NewBook, Pagination},
};

/// Timestamps are kept at millisecond precision, like BSON dates
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Clone, Default)]
pub struct InMemoryBooksRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl InMemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BooksRepository for InMemoryBooksRepository {
    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        let now = now();
        let book = Book {
            id: BookId::new().to_string(),
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            year: book.year,
            price: book.price,
            created_at: now,
            updated_at: now,
        };
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn find_page(&self, pagination: Pagination) -> AppResult<Vec<Book>> {
        let books = self.books.read().await;
        // Newest insertions first among equal timestamps
        let mut sorted: Vec<&Book> = books.iter().rev().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        Ok(sorted.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.books.read().await.len() as u64)
    }

    async fn get_by_id(&self, id: &BookId) -> AppResult<Book> {
        let id = id.to_string();
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(book_not_found)
    }

    async fn update(&self, id: &BookId, changes: BookChanges) -> AppResult<Book> {
        let id = id.to_string();
        let mut books = self.books.write().await;
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(book_not_found)?;

        changes.apply_to(book);
        book.updated_at = now();
        Ok(book.clone())
    }

    async fn delete(&self, id: &BookId) -> AppResult<Book> {
        let id = id.to_string();
        let mut books = self.books.write().await;
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(book_not_found)?;
        Ok(books.remove(index))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "B".to_string(),
            publisher: "C".to_string(),
            year: 2020,
            price: 9.99,
        }
    }

    #[tokio::test]
    async fn test_page_is_newest_first() {
        let repo = InMemoryBooksRepository::new();
        for title in ["first", "second", "third"] {
            repo.insert(new_book(title)).await.unwrap();
        }

        let page = repo
            .find_page(Pagination { page: 1, limit: 2 })
            .await
            .unwrap();
        let titles: Vec<_> = page.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second"]);

        let page = repo
            .find_page(Pagination { page: 2, limit: 2 })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "first");
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let repo = InMemoryBooksRepository::new();
        let result = repo.delete(&BookId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

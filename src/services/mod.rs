//! Business logic services

pub mod books;

use std::sync::Arc;

use crate::repository::BooksRepository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services over the given books store
    pub fn new(repository: Arc<dyn BooksRepository>) -> Self {
        Self {
            books: books::BooksService::new(repository),
        }
    }
}

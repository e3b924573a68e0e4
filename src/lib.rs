//! Bookstore API
//!
//! A small REST JSON service for creating, listing, reading, updating and
//! deleting books stored in a MongoDB collection.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state around an already connected books store
    pub fn new(repository: Arc<dyn repository::BooksRepository>) -> Self {
        Self {
            services: Arc::new(services::Services::new(repository)),
        }
    }
}
